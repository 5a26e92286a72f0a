use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::{BreakpointConfig, BreakpointField};
use crate::models::{ExposureMetadataRecord, SourceFlag};

/// A year in which a station's exposure changed. `from` and `to` hold the
/// category label or the exposure description, depending on the field
/// compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoint {
    pub station_code: String,
    pub year: i32,
    pub from: String,
    pub to: String,
    pub source_flag: SourceFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceBreakpointStats {
    pub source_flag: SourceFlag,
    pub count: usize,
    pub median_year: Option<f64>,
}

pub struct BreakpointDetector {
    config: BreakpointConfig,
}

impl BreakpointDetector {
    pub fn new(config: BreakpointConfig) -> Self {
        Self { config }
    }

    fn value(&self, record: &ExposureMetadataRecord) -> Option<String> {
        match self.config.field {
            BreakpointField::Category => record.exposure_category.map(|c| c.label().to_string()),
            BreakpointField::Exposure => record
                .exposure
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        }
    }

    fn keep(&self, record: &ExposureMetadataRecord) -> bool {
        let Some(source) = record.source_flag else {
            return false;
        };

        if !self.config.include_country_level && source == SourceFlag::CountryEstimated {
            return false;
        }

        // Transition rows are identified by category in either mode.
        self.config.include_transitions
            || record
                .exposure_category
                .map_or(false, |category| !category.is_transition())
    }

    /// Breakpoints per station in station-then-year order. Changes are
    /// only detected between consecutive kept rows of the same station.
    pub fn detect(&self, records: &[ExposureMetadataRecord]) -> Vec<Breakpoint> {
        let mut by_station: HashMap<&str, Vec<(i32, String, SourceFlag)>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for record in records.iter().filter(|r| self.keep(r)) {
            let (Some(value), Some(source_flag)) = (self.value(record), record.source_flag) else {
                continue;
            };

            let entry = by_station.entry(record.station_code.as_str()).or_default();
            if entry.is_empty() {
                order.push(record.station_code.as_str());
            }
            entry.push((record.year, value, source_flag));
        }

        let mut breakpoints = Vec::new();
        for code in order {
            let mut history = by_station.remove(code).unwrap_or_default();
            history.sort_by_key(|(year, _, _)| *year);

            for pair in history.windows(2) {
                let ((_, from, _), (year, to, source_flag)) = (&pair[0], &pair[1]);
                if from != to {
                    breakpoints.push(Breakpoint {
                        station_code: code.to_string(),
                        year: *year,
                        from: from.clone(),
                        to: to.clone(),
                        source_flag: *source_flag,
                    });
                }
            }
        }

        breakpoints
    }
}

impl Default for BreakpointDetector {
    fn default() -> Self {
        Self::new(BreakpointConfig::default())
    }
}

/// Count and median breakpoint year for each source flag present.
pub fn summarize_breakpoints(breakpoints: &[Breakpoint]) -> Vec<SourceBreakpointStats> {
    let mut years: BTreeMap<SourceFlag, Vec<i32>> = BTreeMap::new();
    for breakpoint in breakpoints {
        years
            .entry(breakpoint.source_flag)
            .or_default()
            .push(breakpoint.year);
    }

    years
        .into_iter()
        .map(|(source_flag, mut years)| {
            years.sort_unstable();
            SourceBreakpointStats {
                source_flag,
                count: years.len(),
                median_year: median(&years),
            }
        })
        .collect()
}

fn median(sorted: &[i32]) -> Option<f64> {
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2] as f64),
        n => Some((sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0),
    }
}
