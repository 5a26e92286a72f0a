use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use validator::Validate;

use crate::error::Result;
use crate::models::{
    normalize_station_code, StationMetadata, StationTemperatureRecord, TemperatureTable,
};

/// One CSV row: `year,1..12,stationcode,stationlat,...`
#[derive(Debug, Deserialize)]
struct RawTemperatureRow {
    year: i32,
    #[serde(rename = "1")]
    m01: Option<f64>,
    #[serde(rename = "2")]
    m02: Option<f64>,
    #[serde(rename = "3")]
    m03: Option<f64>,
    #[serde(rename = "4")]
    m04: Option<f64>,
    #[serde(rename = "5")]
    m05: Option<f64>,
    #[serde(rename = "6")]
    m06: Option<f64>,
    #[serde(rename = "7")]
    m07: Option<f64>,
    #[serde(rename = "8")]
    m08: Option<f64>,
    #[serde(rename = "9")]
    m09: Option<f64>,
    #[serde(rename = "10")]
    m10: Option<f64>,
    #[serde(rename = "11")]
    m11: Option<f64>,
    #[serde(rename = "12")]
    m12: Option<f64>,
    stationcode: String,
    stationlat: f64,
    stationlon: f64,
    stationelevation: Option<f64>,
    stationname: Option<String>,
    stationcountry: Option<String>,
    stationfirstyear: Option<f64>,
    stationlastyear: Option<f64>,
    stationsource: Option<String>,
}

impl RawTemperatureRow {
    fn station(&self) -> StationMetadata {
        StationMetadata::new(
            &self.stationcode,
            self.stationname.clone().unwrap_or_default().trim().to_string(),
            self.stationcountry.clone().unwrap_or_default().trim().to_string(),
            self.stationlat,
            self.stationlon,
        )
        .with_elevation(self.stationelevation.filter(|e| !e.is_nan()))
        .with_year_span(
            self.stationfirstyear.filter(|y| !y.is_nan()).map(|y| y as i32),
            self.stationlastyear.filter(|y| !y.is_nan()).map(|y| y as i32),
        )
        .with_source(self.stationsource.clone())
    }

    fn values(&self) -> [Option<f64>; 12] {
        [
            self.m01, self.m02, self.m03, self.m04, self.m05, self.m06, self.m07, self.m08,
            self.m09, self.m10, self.m11, self.m12,
        ]
    }
}

/// Reads station-year temperature tables (and correction tables written
/// by [`crate::writers::TableWriter`]) from CSV.
pub struct TemperatureReader {
    validate_stations: bool,
}

impl TemperatureReader {
    pub fn new() -> Self {
        Self {
            validate_stations: true,
        }
    }

    pub fn with_validation(validate_stations: bool) -> Self {
        Self { validate_stations }
    }

    pub fn read_table(&self, path: &Path) -> Result<TemperatureTable> {
        debug!("Reading temperature table {}", path.display());
        self.read_from(File::open(path)?)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<TemperatureTable> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut stations: HashMap<String, Arc<StationMetadata>> = HashMap::new();
        let mut rows = Vec::new();

        for result in csv_reader.deserialize::<RawTemperatureRow>() {
            let raw = result?;
            let code = normalize_station_code(&raw.stationcode);

            let station = match stations.get(&code) {
                Some(station) => Arc::clone(station),
                None => {
                    let station = raw.station();
                    if self.validate_stations {
                        station.validate()?;
                    }
                    let station = Arc::new(station);
                    stations.insert(code, Arc::clone(&station));
                    station
                }
            };

            rows.push(StationTemperatureRecord::new(station, raw.year, raw.values()));
        }

        if rows.is_empty() {
            warn!("Temperature table contains no rows");
        }

        debug!("Read {} rows for {} stations", rows.len(), stations.len());
        Ok(TemperatureTable::new(rows))
    }
}

impl Default for TemperatureReader {
    fn default() -> Self {
        Self::new()
    }
}
