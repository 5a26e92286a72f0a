use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::STATION_CODE_WIDTH;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub code: String,

    pub name: String,

    pub country: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 360.0))]
    pub longitude: f64,

    pub elevation: Option<f64>,

    pub first_year: Option<i32>,

    pub last_year: Option<i32>,

    pub source: Option<String>,
}

impl StationMetadata {
    pub fn new(code: &str, name: String, country: String, latitude: f64, longitude: f64) -> Self {
        Self {
            code: normalize_station_code(code),
            name,
            country,
            latitude,
            longitude,
            elevation: None,
            first_year: None,
            last_year: None,
            source: None,
        }
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_year_span(mut self, first_year: Option<i32>, last_year: Option<i32>) -> Self {
        self.first_year = first_year;
        self.last_year = last_year;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }
}

/// Zero-pad a station code to six characters (`36456` -> `036456`).
///
/// Codes exported from spreadsheets often arrive as integers or floats
/// (`36456.0`), so a trailing `.0` is dropped first.
pub fn normalize_station_code(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    format!("{:0>width$}", trimmed, width = STATION_CODE_WIDTH)
}

/// Header line of a station block in the CRUTEM fixed-width format.
#[derive(Debug, Clone, PartialEq)]
pub struct CrutemHeader {
    pub line: String,
    pub code: String,
    pub latitude: f64,
}

impl CrutemHeader {
    /// Build a minimal header holding only the station code and latitude.
    pub fn new(code: &str, latitude: f64) -> Self {
        let code = normalize_station_code(code);
        let tenths = (latitude * 10.0).round() as i32;
        Self {
            line: format!("{:<6.6}{:>4}", code, tenths),
            code,
            latitude: tenths as f64 / 10.0,
        }
    }

    /// Parse a header line: chars 0..6 hold the code, chars 6..10 the
    /// latitude in tenths of a degree.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let code: String = line.chars().take(6).collect();
        let latitude_field: String = line.chars().skip(6).take(4).collect();

        if code.chars().count() < 6 {
            return Err(ProcessingError::InvalidFormat(format!(
                "CRUTEM header too short: '{}'",
                line
            )));
        }

        let tenths = latitude_field.trim().parse::<i32>().map_err(|_| {
            ProcessingError::InvalidFormat(format!(
                "Invalid CRUTEM header latitude '{}' in line '{}'",
                latitude_field, line
            ))
        })?;

        Ok(Self {
            line: line.to_string(),
            code,
            latitude: tenths as f64 / 10.0,
        })
    }
}
