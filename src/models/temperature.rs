use std::sync::Arc;

use crate::error::{ProcessingError, Result};
use crate::models::StationMetadata;
use crate::utils::constants::MONTHS_PER_YEAR;

/// Twelve monthly values, January first. `None` marks a missing value.
pub type MonthlyValues = [Option<f64>; MONTHS_PER_YEAR];

/// Treat NaN as a missing value.
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Convert a calendar month (1-12) into a column index.
pub fn month_index(month: u32) -> Result<usize> {
    if (1..=MONTHS_PER_YEAR as u32).contains(&month) {
        Ok(month as usize - 1)
    } else {
        Err(ProcessingError::InvalidFormat(format!(
            "Month {} is outside 1-12",
            month
        )))
    }
}

/// One station-year row of monthly values.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTemperatureRecord {
    pub station: Arc<StationMetadata>,
    pub year: i32,
    pub values: MonthlyValues,
}

impl StationTemperatureRecord {
    pub fn new(station: Arc<StationMetadata>, year: i32, values: MonthlyValues) -> Self {
        Self {
            station,
            year,
            values: values.map(present),
        }
    }

    pub fn station_code(&self) -> &str {
        &self.station.code
    }

    pub fn latitude(&self) -> f64 {
        self.station.latitude
    }

    pub fn value(&self, month: u32) -> Result<Option<f64>> {
        Ok(self.values[month_index(month)?])
    }

    /// Same station and year with a different set of monthly values.
    pub fn with_values(&self, values: MonthlyValues) -> Self {
        Self {
            station: Arc::clone(&self.station),
            year: self.year,
            values,
        }
    }

    /// Mean of the months that are present.
    pub fn annual_mean(&self) -> Option<f64> {
        let present: Vec<f64> = self.values.iter().flatten().copied().collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}
