use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ZeroOutRules;
use crate::error::{ProcessingError, Result};
use crate::models::ExposureCategory;

/// Provenance tier of an exposure bias estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceFlag {
    /// Exposure documented in station-specific metadata.
    Documented = 1,
    /// Exposure estimated from incomplete station-specific metadata.
    StationEstimated = 2,
    /// Exposure estimated from country or state level metadata.
    CountryEstimated = 3,
}

impl SourceFlag {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SourceFlag::Documented),
            2 => Ok(SourceFlag::StationEstimated),
            3 => Ok(SourceFlag::CountryEstimated),
            _ => Err(ProcessingError::InvalidSourceFlag(value)),
        }
    }

    /// Parse the float-encoded flag columns found in the source CSVs.
    pub fn from_f64(value: f64) -> Result<Self> {
        if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Source flag must be a small integer, got {}",
                value
            )));
        }
        Self::from_u8(value as u8)
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Why a bias row was forced to zero before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroOutReason {
    /// The raw record was already exposure corrected upstream.
    AlreadyCorrected,
    /// Country-level estimates are excluded by configuration.
    CountryLevelEstimate,
}

/// One monthly exposure bias estimate for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationBiasRecord {
    pub station_code: String,
    pub timestamp: NaiveDate,
    pub bias: Option<f64>,
    /// Width of the 95% interval.
    pub uncertainty: Option<f64>,
    pub exposure_category: Option<ExposureCategory>,
    pub source_flag: Option<SourceFlag>,
    pub exposure_corrected: bool,
}

impl StationBiasRecord {
    pub fn new(station_code: &str, timestamp: NaiveDate, bias: Option<f64>) -> Self {
        Self {
            station_code: station_code.to_string(),
            timestamp,
            bias,
            uncertainty: None,
            exposure_category: None,
            source_flag: None,
            exposure_corrected: false,
        }
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn zero_out_reason(&self, rules: &ZeroOutRules) -> Option<ZeroOutReason> {
        if self.exposure_corrected {
            Some(ZeroOutReason::AlreadyCorrected)
        } else if rules.country_level_estimates
            && self.source_flag == Some(SourceFlag::CountryEstimated)
        {
            Some(ZeroOutReason::CountryLevelEstimate)
        } else {
            None
        }
    }

    /// Copy of this row with the zero-out rules applied: bias forced to
    /// 0.0 and uncertainty to absent. Absent biases are otherwise kept as
    /// absent.
    pub fn normalized(&self, rules: &ZeroOutRules) -> Self {
        let mut record = self.clone();
        if self.zero_out_reason(rules).is_some() {
            record.bias = Some(0.0);
            record.uncertainty = None;
        }
        record
    }
}

/// The full bias model, sparse over stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasModel {
    records: Vec<StationBiasRecord>,
}

impl BiasModel {
    pub fn new(records: Vec<StationBiasRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StationBiasRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, other: BiasModel) {
        self.records.extend(other.records);
    }

    /// Rows per station code, each list in file order.
    pub fn by_station(&self) -> HashMap<&str, Vec<&StationBiasRecord>> {
        let mut grouped: HashMap<&str, Vec<&StationBiasRecord>> = HashMap::new();
        for record in &self.records {
            grouped
                .entry(record.station_code.as_str())
                .or_default()
                .push(record);
        }
        grouped
    }

    /// Count the rows each zero-out rule would affect.
    pub fn count_zero_outs(&self, rules: &ZeroOutRules) -> (usize, usize) {
        self.records
            .iter()
            .fold((0, 0), |(corrected, country), r| match r.zero_out_reason(rules) {
                Some(ZeroOutReason::AlreadyCorrected) => (corrected + 1, country),
                Some(ZeroOutReason::CountryLevelEstimate) => (corrected, country + 1),
                None => (corrected, country),
            })
    }
}
