use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use clap::Parser;
use exposure_bias::cli::{Cli, Commands};
use exposure_bias::config::{CorrectionConfig, YearRange};
use exposure_bias::models::TemperatureTable;
use exposure_bias::processors::{hemispheric_means, CorrectionPipeline, Hemisphere, ZonalAggregator};
use exposure_bias::readers::{BiasModelReader, CrutemReader, LandMaskReader, TemperatureReader};
use exposure_bias::utils::constants::{DEGREES_OF_LATITUDE, MONTHS_PER_YEAR};
use exposure_bias::writers::{CrutemWriter, TableWriter};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const TEMPERATURE_HEADER: &str = "year,1,2,3,4,5,6,7,8,9,10,11,12,stationcode,stationlat,stationlon";
const BIAS_HEADER: &str = "index,stationcode,exposure_category,bias_estimate,bias_estimate_2.5,bias_estimate_97.5,source_flag,exposurecorrected_flag";

fn write_temperatures(dir: &Path) -> std::path::PathBuf {
    let mut data = format!("{}\n", TEMPERATURE_HEADER);
    for (code, lat, lon) in [("36456", 51.8, -1.3), ("999999", -33.9, 18.4)] {
        for year in 1900..=1902 {
            let values: Vec<String> = (1..=MONTHS_PER_YEAR)
                .map(|m| {
                    if year == 1901 && m == 6 {
                        String::new()
                    } else {
                        format!("{}", 10.0 + m as f64 * 0.5)
                    }
                })
                .collect();
            writeln!(data, "{},{},{},{},{}", year, values.join(","), code, lat, lon).unwrap();
        }
    }

    let path = dir.join("temperatures.csv");
    fs::write(&path, data).unwrap();
    path
}

fn write_bias_model(dir: &Path) -> std::path::PathBuf {
    let mut data = format!("{}\n", BIAS_HEADER);
    for year in 1900..=1902 {
        for month in 1..=MONTHS_PER_YEAR {
            let bias = 0.01 * month as f64 + 0.1 * (year - 1900) as f64;
            let corrected = if year == 1902 { "1" } else { "0" };
            writeln!(
                data,
                "{}-{:02}-28,036456,Open,{},{},{},1,{}",
                year,
                month,
                bias,
                bias - 0.05,
                bias + 0.05,
                corrected
            )
            .unwrap();
        }
    }

    let path = dir.join("bias_model.csv");
    fs::write(&path, data).unwrap();
    path
}

fn land_mask_csv(dir: &Path) -> std::path::PathBuf {
    let mut data = "lat,lon,sftof\n".to_string();
    for i in 0..DEGREES_OF_LATITUDE {
        let lat = 89.5 - i as f64;
        for lon in [0.5, 1.5] {
            writeln!(data, "{},{},{}", lat, lon, if lat > 0.0 { 60.0 } else { 20.0 }).unwrap();
        }
    }

    let path = dir.join("land_mask.csv");
    fs::write(&path, data).unwrap();
    path
}

fn correct(dir: &Path) -> (TemperatureTable, TemperatureTable, TemperatureTable) {
    let temperatures = TemperatureReader::new()
        .read_table(&write_temperatures(dir))
        .unwrap();
    let model = BiasModelReader::new()
        .read_model(&write_bias_model(dir))
        .unwrap();

    let output = CorrectionPipeline::new(CorrectionConfig::default())
        .run(&temperatures, &model, None)
        .unwrap();

    (temperatures, output.tables.corrected, output.tables.corrections)
}

#[test]
fn test_correction_is_additive() {
    let dir = TempDir::new().unwrap();
    let (original, corrected, corrections) = correct(dir.path());

    assert_eq!(original.len(), corrected.len());
    assert_eq!(original.len(), corrections.len());

    for ((o, c), e) in original.iter().zip(&corrected).zip(&corrections) {
        assert_eq!(o.station_code(), c.station_code());
        assert_eq!(o.year, e.year);
        for month in 0..MONTHS_PER_YEAR {
            let bias = e.values[month].unwrap();
            assert_eq!(c.values[month], o.values[month].map(|t| t + bias));
        }
    }
}

#[test]
fn test_known_corrections() {
    let dir = TempDir::new().unwrap();
    let (_, corrected, corrections) = correct(dir.path());

    let oxford: Vec<_> = corrections
        .iter()
        .filter(|r| r.station_code() == "036456")
        .collect();
    assert_eq!(oxford.len(), 3);
    assert!((oxford[1].values[2].unwrap() - 0.13).abs() < 1e-12);
    // Already exposure corrected in the model.
    assert_eq!(oxford[2].values, [Some(0.0); MONTHS_PER_YEAR]);

    // Missing temperatures stay missing; the correction is still recorded.
    let oxford_1901 = corrected
        .iter()
        .find(|r| r.station_code() == "036456" && r.year == 1901)
        .unwrap();
    assert_eq!(oxford_1901.values[5], None);
    assert!(oxford[1].values[5].unwrap() > 0.0);
}

#[test]
fn test_station_without_model_passes_through() {
    let dir = TempDir::new().unwrap();
    let (original, corrected, corrections) = correct(dir.path());

    for ((o, c), e) in original
        .iter()
        .zip(&corrected)
        .zip(&corrections)
        .filter(|((o, _), _)| o.station_code() == "999999")
    {
        assert_eq!(o.values, c.values);
        assert_eq!(e.values, [Some(0.0); MONTHS_PER_YEAR]);
    }
}

#[test]
fn test_written_tables_read_back() {
    let dir = TempDir::new().unwrap();
    let (_, corrected, corrections) = correct(dir.path());

    let writer = TableWriter::new();
    let corrected_path = dir.path().join("temp_ebc.csv");
    let corrections_path = dir.path().join("ebc.csv");
    writer.write_table(&corrected, &corrected_path).unwrap();
    writer.write_table(&corrections, &corrections_path).unwrap();

    let reader = TemperatureReader::new();
    let corrected_back = reader.read_table(&corrected_path).unwrap();
    let corrections_back = reader.read_table(&corrections_path).unwrap();

    for (a, b) in corrected.iter().zip(&corrected_back) {
        assert_eq!(a.values, b.values);
    }
    for (a, b) in corrections.iter().zip(&corrections_back) {
        assert_eq!(a.values, b.values);
    }
}

#[test]
fn test_aggregation_from_files() {
    let dir = TempDir::new().unwrap();
    let (_, _, corrections) = correct(dir.path());
    let mask = LandMaskReader::new()
        .read_mask(&land_mask_csv(dir.path()))
        .unwrap();

    let aggregator = ZonalAggregator::from_mask(&mask, 5.0).unwrap();
    let weights = aggregator.weights();
    assert_eq!(weights.bins.len(), 36);
    for w in &weights.bins {
        assert!((0.0..=1.0).contains(&w.lat_weight));
        assert!((0.0..=1.0).contains(&w.land_weight));
        assert!((0.0..=1.0).contains(&w.weight));
    }

    // Only the northern station carries non-zero corrections.
    let curves = aggregator.aggregate(&corrections);
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].bin.lower, 50.0);
    assert_eq!(curves[0].stations, 1);

    let means = hemispheric_means(&corrections);
    let south = means
        .iter()
        .find(|m| m.hemisphere == Hemisphere::Southern)
        .unwrap();
    assert!(south.annual.values().all(|v| *v == Some(0.0)));
}

#[test]
fn test_crutem_export_from_files() {
    let dir = TempDir::new().unwrap();
    let stations = dir.path().join("stations.txt");
    fs::write(
        &stations,
        "036456 518  -13   63 OXFORD               UK            1815 2021  101815  -999.0\n\
         1900   23   34   56   78   99  123  145  143  121   98   67   45\n",
    )
    .unwrap();

    let headers = CrutemReader::new().read_headers(&stations).unwrap();
    let model = BiasModelReader::new()
        .read_model(&write_bias_model(dir.path()))
        .unwrap();

    let output = dir.path().join("ebc.txt");
    CrutemWriter::new(YearRange::new(1899, 1902))
        .write_bias_model(&headers, &model, &output)
        .unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("036456 518"));
    assert!(lines[1].starts_with("1899 -999 -999"));
    assert!(lines[2].starts_with("1900   10   20   30"));
    assert!(lines[4].starts_with("1902    0    0"));
}

#[test]
fn test_cli_parses_correct_command() {
    let cli = Cli::try_parse_from([
        "exposure-bias",
        "--verbose",
        "correct",
        "--temperatures",
        "t.csv",
        "--bias-model",
        "part1.csv",
        "part2.csv",
        "--exclude-country-level",
        "--end-year",
        "2020",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Correct {
            bias_model,
            exclude_country_level,
            end_year,
            compression,
            ..
        } => {
            assert_eq!(bias_model.len(), 2);
            assert!(exclude_country_level);
            assert_eq!(end_year, Some(2020));
            assert_eq!(compression, "snappy");
        }
        _ => panic!("expected correct command"),
    }
}

#[test]
fn test_cli_requires_bias_model() {
    assert!(Cli::try_parse_from(["exposure-bias", "correct", "--temperatures", "t.csv"]).is_err());
}

#[test]
fn test_cli_parses_breakpoints_by_exposure() {
    let cli = Cli::try_parse_from([
        "exposure-bias",
        "breakpoints",
        "--metadata",
        "metadata.csv",
        "--by-exposure",
    ])
    .unwrap();

    match cli.command {
        Commands::Breakpoints { by_exposure, exclude_transitions, .. } => {
            assert!(by_exposure);
            assert!(!exclude_transitions);
        }
        _ => panic!("expected breakpoints command"),
    }
}
