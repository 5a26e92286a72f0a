use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    normalize_station_code, present, ExposureCategory, ExposureMetadataRecord, SourceFlag,
};

/// Extra columns in the station metadata export are ignored.
#[derive(Debug, Deserialize)]
struct RawExposureRow {
    year: i32,
    stationcode: String,
    stationlat: Option<f64>,
    stationlon: Option<f64>,
    stationelevation: Option<f64>,
    exposure: Option<String>,
    exposure_category: Option<String>,
    source_flag: Option<f64>,
    exposurecorrected_flag: Option<f64>,
}

impl RawExposureRow {
    fn into_record(self) -> Result<ExposureMetadataRecord> {
        let source_flag = match present(self.source_flag) {
            Some(flag) => Some(SourceFlag::from_f64(flag)?),
            None => None,
        };

        let exposure = self
            .exposure
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("nan"));

        Ok(ExposureMetadataRecord {
            station_code: normalize_station_code(&self.stationcode),
            year: self.year,
            latitude: present(self.stationlat),
            longitude: present(self.stationlon),
            elevation: present(self.stationelevation),
            exposure,
            exposure_category: ExposureCategory::parse_optional(self.exposure_category.as_deref())?,
            source_flag,
            exposure_corrected: present(self.exposurecorrected_flag) == Some(1.0),
        })
    }
}

/// Reads per station-year exposure history.
pub struct ExposureMetadataReader;

impl ExposureMetadataReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<ExposureMetadataRecord>> {
        debug!("Reading exposure metadata {}", path.display());
        self.read_from(File::open(path)?)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<ExposureMetadataRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        csv_reader
            .deserialize::<RawExposureRow>()
            .map(|row| row?.into_record())
            .collect()
    }
}

impl Default for ExposureMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}
