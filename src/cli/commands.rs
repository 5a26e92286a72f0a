use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn, Level};

use crate::cli::args::{Cli, Commands};
use crate::config::{check_lat_step, BreakpointField, CorrectionConfig};
use crate::error::{ProcessingError, Result};
use crate::processors::{
    hemispheric_means, summarize_breakpoints, BreakpointDetector, CorrectionPipeline,
    ZonalAggregator,
};
use crate::readers::{
    BiasModelReader, CrutemReader, ExposureMetadataReader, LandMaskReader, TemperatureReader,
};
use crate::utils::constants::{CORRECTED_TABLE_FILE, CORRECTION_TABLE_FILE};
use crate::utils::filename::{generate_default_output_dir, table_path};
use crate::utils::progress::ProgressReporter;
use crate::writers::{AggregateReport, AggregateWriter, CrutemWriter, ParquetWriter, TableWriter};

/// Install the fmt subscriber: DEBUG with `--verbose`, INFO otherwise.
/// A log file replaces stderr and is written without colour codes.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match log_file {
        Some(path) => builder
            .with_writer(Mutex::new(File::create(path)?))
            .with_ansi(false)
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    }
    .map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let mut config = CorrectionConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Correct {
            temperatures,
            bias_model,
            output_dir,
            parquet,
            compression,
            exclude_country_level,
            start_year,
            end_year,
            quiet,
        } => {
            if exclude_country_level {
                config.zero_out.country_level_estimates = true;
            }
            if let Some(start) = start_year {
                config.year_range.start = start;
            }
            if let Some(end) = end_year {
                config.year_range.end = end;
            }
            config.check()?;

            println!("Correcting temperature data...");
            println!("Temperatures: {}", temperatures.display());
            println!("Bias model: {} part(s)", bias_model.len());

            let reading = ProgressReporter::new_spinner("Reading inputs...", quiet);
            let table = TemperatureReader::new().read_table(&temperatures)?;
            reading.set_message("Reading bias model...");
            let model = BiasModelReader::new().read_parts(&bias_model)?;
            reading.finish_with_message(&format!(
                "Read {} temperature rows and {} bias rows",
                table.len(),
                model.len()
            ));

            let progress = ProgressReporter::new(
                table.station_codes().len() as u64,
                "Correcting stations...",
                quiet,
            );
            let output = CorrectionPipeline::new(config).run(&table, &model, Some(&progress))?;
            progress.finish_with_message(&format!(
                "Corrected {} stations",
                output.summary.stations_corrected
            ));

            let output_dir = output_dir.unwrap_or_else(generate_default_output_dir);
            std::fs::create_dir_all(&output_dir)?;

            let tables = [
                (CORRECTED_TABLE_FILE, &output.tables.corrected),
                (CORRECTION_TABLE_FILE, &output.tables.corrections),
            ];

            let csv_writer = TableWriter::new();
            for (stem, table) in &tables {
                let path = table_path(&output_dir, stem, "csv");
                csv_writer.write_table(table, &path)?;
                info!("Wrote {}", path.display());
            }

            if parquet {
                let writer = ParquetWriter::new().with_compression(&compression)?;
                for (stem, table) in &tables {
                    let path = table_path(&output_dir, stem, "parquet");
                    writer.write_table(table, &path)?;
                    println!("\n{}\n{}", path.display(), writer.get_file_info(&path)?.summary());
                }
            }

            println!("\n{}", output.summary.summary());
            println!("Output written to {}", output_dir.display());
        }

        Commands::Aggregate {
            corrections,
            land_mask,
            lat_step,
            output,
            csv,
        } => {
            let lat_step = lat_step.unwrap_or(config.aggregation.lat_step);
            check_lat_step(lat_step)?;
            let mask_path: PathBuf = land_mask
                .or_else(|| config.aggregation.land_mask_path.clone())
                .ok_or_else(|| {
                    ProcessingError::Config(
                        "No land mask given (--land-mask or aggregation.land_mask_path)".to_string(),
                    )
                })?;

            let table = TemperatureReader::new().read_table(&corrections)?;
            let mask = LandMaskReader::new().read_mask(&mask_path)?;

            let aggregator = ZonalAggregator::from_mask(&mask, lat_step)?;
            let curves = aggregator.aggregate(&table);
            let hemispheres = hemispheric_means(&table);

            if curves.is_empty() {
                warn!("No latitude band produced a non-zero correction curve");
            }

            println!("Zonal correction curves ({}° bands):", lat_step);
            for curve in &curves {
                println!(
                    "  {:>12} weight={:.4} stations={:<5} rms={:.4}",
                    curve.bin.label(),
                    curve.weight,
                    curve.stations,
                    curve.rms
                );
            }

            println!("\nHemispheric annual mean corrections:");
            for mean in &hemispheres {
                let annual: Vec<f64> = mean.annual.values().flatten().copied().collect();
                let overall = if annual.is_empty() {
                    "n/a".to_string()
                } else {
                    format!("{:.4}", annual.iter().sum::<f64>() / annual.len() as f64)
                };
                println!(
                    "  {}: {} years, mean {}",
                    mean.hemisphere.abbreviation(),
                    annual.len(),
                    overall
                );
            }

            let writer = AggregateWriter::new();
            if let Some(path) = output {
                let report = AggregateReport {
                    weights: aggregator.weights(),
                    curves: &curves,
                    hemispheres: &hemispheres,
                };
                writer.write_json(&report, &path)?;
                println!("Report written to {}", path.display());
            }
            if let Some(path) = csv {
                writer.write_curves_csv(&curves, File::create(&path)?)?;
                println!("Curves written to {}", path.display());
            }
        }

        Commands::ExportCrutem {
            bias_model,
            stations,
            output,
            exclude_country_level,
        } => {
            if exclude_country_level {
                config.zero_out.country_level_estimates = true;
            }

            let headers = CrutemReader::new().read_headers(&stations)?;
            let model = BiasModelReader::new().read_parts(&bias_model)?;

            CrutemWriter::new(config.export)
                .with_rules(config.zero_out.clone())
                .write_bias_model(&headers, &model, &output)?;

            println!(
                "Exported {} stations ({}-{}) to {}",
                headers.len(),
                config.export.start,
                config.export.end,
                output.display()
            );
        }

        Commands::Breakpoints {
            metadata,
            output,
            exclude_country_level,
            exclude_transitions,
            by_exposure,
        } => {
            if by_exposure {
                config.breakpoints.field = BreakpointField::Exposure;
            }
            if exclude_country_level {
                config.breakpoints.include_country_level = false;
            }
            if exclude_transitions {
                config.breakpoints.include_transitions = false;
            }

            let records = ExposureMetadataReader::new().read_records(&metadata)?;
            let breakpoints = BreakpointDetector::new(config.breakpoints.clone()).detect(&records);
            let stats = summarize_breakpoints(&breakpoints);

            let writer = AggregateWriter::new();
            println!("{}", writer.breakpoint_summary(&stats));

            if let Some(path) = output {
                writer.write_breakpoints_csv(&breakpoints, File::create(&path)?)?;
                println!("Breakpoints written to {}", path.display());
            }
        }
    }

    Ok(())
}
