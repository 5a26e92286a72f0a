use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exposure-bias")]
#[command(about = "Exposure bias correction for land-surface temperature station records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the bias model to a station temperature table
    Correct {
        #[arg(short, long, help = "Station-year temperature CSV")]
        temperatures: PathBuf,

        #[arg(short, long, num_args = 1.., required = true, help = "Bias model CSV part(s)")]
        bias_model: Vec<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output directory [default: output/ebc-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Also write Parquet copies of both tables")]
        parquet: bool,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, help = "Zero bias rows estimated from country-level metadata")]
        exclude_country_level: bool,

        #[arg(long)]
        start_year: Option<i32>,

        #[arg(long)]
        end_year: Option<i32>,

        #[arg(long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Area-weighted zonal curves and hemispheric means of a correction table
    Aggregate {
        #[arg(short, long, help = "Correction-only table written by `correct`")]
        corrections: PathBuf,

        #[arg(short, long, help = "Long-form land fraction CSV (lat,lon,fraction)")]
        land_mask: Option<PathBuf>,

        #[arg(long)]
        lat_step: Option<f64>,

        #[arg(short, long, help = "JSON report path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Long-form zonal curve CSV path")]
        csv: Option<PathBuf>,
    },

    /// Write the bias model in CRUTEM station format
    ExportCrutem {
        #[arg(short, long, num_args = 1.., required = true, help = "Bias model CSV part(s)")]
        bias_model: Vec<PathBuf>,

        #[arg(short, long, help = "CRUTEM station file providing the headers")]
        stations: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, help = "Zero bias rows estimated from country-level metadata")]
        exclude_country_level: bool,
    },

    /// Detect exposure changes in station metadata
    Breakpoints {
        #[arg(short, long, help = "Exposure metadata CSV")]
        metadata: PathBuf,

        #[arg(short, long, help = "Breakpoint CSV path")]
        output: Option<PathBuf>,

        #[arg(long)]
        exclude_country_level: bool,

        #[arg(long)]
        exclude_transitions: bool,

        #[arg(long, help = "Compare the free-text exposure instead of the exposure category")]
        by_exposure: bool,
    },
}
