use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    normalize_station_code, present, BiasModel, ExposureCategory, SourceFlag, StationBiasRecord,
};

#[derive(Debug, Deserialize)]
struct RawBiasRow {
    #[serde(rename = "index", alias = "datetime", alias = "date")]
    timestamp: String,
    stationcode: String,
    exposure_category: Option<String>,
    bias_estimate: Option<f64>,
    #[serde(rename = "bias_estimate_2.5")]
    lower: Option<f64>,
    #[serde(rename = "bias_estimate_97.5")]
    upper: Option<f64>,
    source_flag: Option<f64>,
    exposurecorrected_flag: Option<f64>,
}

impl RawBiasRow {
    fn into_record(self) -> Result<StationBiasRecord> {
        let bias = present(self.bias_estimate);
        let lower = present(self.lower);
        // The upper bound carries stray values where no interval exists.
        let upper = if bias.is_none() && lower.is_none() {
            None
        } else {
            present(self.upper)
        };

        let source_flag = match present(self.source_flag) {
            Some(flag) => Some(SourceFlag::from_f64(flag)?),
            None => None,
        };

        Ok(StationBiasRecord {
            station_code: normalize_station_code(&self.stationcode),
            timestamp: parse_timestamp(&self.timestamp)?,
            bias,
            uncertainty: upper.zip(lower).map(|(u, l)| u - l),
            exposure_category: ExposureCategory::parse_optional(self.exposure_category.as_deref())?,
            source_flag,
            exposure_corrected: present(self.exposurecorrected_flag) == Some(1.0),
        })
    }
}

/// Parse the mixed `dd/mm/yyyy` and `yyyy-mm-dd` timestamps in the model
/// files. A trailing time of day is ignored.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDate> {
    let date = raw.split_whitespace().next().unwrap_or_default();
    let parsed = if date.contains('/') {
        NaiveDate::parse_from_str(date, "%d/%m/%Y")?
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")?
    };
    Ok(parsed)
}

/// Reads exposure bias model CSV files.
pub struct BiasModelReader;

impl BiasModelReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_model(&self, path: &Path) -> Result<BiasModel> {
        debug!("Reading bias model {}", path.display());
        self.read_from(File::open(path)?)
    }

    /// Concatenate several model part files in the order given.
    pub fn read_parts(&self, paths: &[PathBuf]) -> Result<BiasModel> {
        let mut model = BiasModel::default();
        for path in paths {
            model.extend(self.read_model(path)?);
        }
        info!("Loaded {} bias rows from {} file(s)", model.len(), paths.len());
        Ok(model)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<BiasModel> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize::<RawBiasRow>() {
            records.push(result?.into_record()?);
        }

        Ok(BiasModel::new(records))
    }
}

impl Default for BiasModelReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "index,stationcode,exposure_category,bias_estimate,bias_estimate_2.5,bias_estimate_97.5,source_flag,exposurecorrected_flag";

    #[test]
    fn test_parse_mixed_timestamps() {
        let a = parse_timestamp("31/01/1850").unwrap();
        let b = parse_timestamp("1850-01-31").unwrap();
        let c = parse_timestamp("1850-01-31 00:00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.month(), 1);
        assert!(parse_timestamp("Jan 1850").is_err());
    }

    #[test]
    fn test_read_model_rows() -> Result<()> {
        let data = format!(
            "{}\n\
            31/01/1850,36456,Wall,-0.25,-0.35,-0.15,1,\n\
            1850-02-28,36456,Wall,,,0.4,2.0,\n\
            1850-03-31,36456,Stevenson screen,0.8,0.7,0.9,3,1.0\n\
            1850-04-30,36456,nan,,,,,\n",
            HEADER
        );

        let model = BiasModelReader::new().read_from(data.as_bytes())?;
        let rows = model.records();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].station_code, "036456");
        assert_eq!(rows[0].bias, Some(-0.25));
        assert!((rows[0].uncertainty.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(rows[0].exposure_category, Some(ExposureCategory::Wall));
        assert_eq!(rows[0].source_flag, Some(SourceFlag::Documented));
        assert!(!rows[0].exposure_corrected);

        // Stray upper bound without an estimate or lower bound.
        assert_eq!(rows[1].bias, None);
        assert_eq!(rows[1].uncertainty, None);
        assert_eq!(rows[1].source_flag, Some(SourceFlag::StationEstimated));

        assert!(rows[2].exposure_corrected);
        assert_eq!(rows[2].source_flag, Some(SourceFlag::CountryEstimated));

        assert_eq!(rows[3].exposure_category, None);
        assert_eq!(rows[3].source_flag, None);

        Ok(())
    }

    #[test]
    fn test_read_parts_concatenates() -> Result<()> {
        let mut part1 = NamedTempFile::new()?;
        writeln!(part1, "{}", HEADER)?;
        writeln!(part1, "1850-01-31,1,Wall,0.1,0.0,0.2,1,")?;
        let mut part2 = NamedTempFile::new()?;
        writeln!(part2, "{}", HEADER)?;
        writeln!(part2, "1850-01-31,2,Open,0.3,0.2,0.4,1,")?;

        let paths = vec![part1.path().to_path_buf(), part2.path().to_path_buf()];
        let model = BiasModelReader::new().read_parts(&paths)?;

        assert_eq!(model.len(), 2);
        assert_eq!(model.records()[0].station_code, "000001");
        assert_eq!(model.records()[1].station_code, "000002");

        Ok(())
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let data = format!("{}\n1850-01-31,1,Greenhouse,0.1,0.0,0.2,1,\n", HEADER);
        assert!(BiasModelReader::new().read_from(data.as_bytes()).is_err());
    }
}
