use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::CorrectionConfig;
use crate::error::Result;
use crate::models::{BiasModel, TemperatureTable};
use crate::processors::{AlignedBiasSeries, BiasAligner, BiasApplicator, CorrectionTables};
use crate::utils::progress::ProgressReporter;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionSummary {
    pub temperature_rows: usize,
    pub rows_trimmed: usize,
    pub stations_total: usize,
    pub stations_corrected: usize,
    pub stations_passed_through: usize,
    /// Stations in the bias model with no temperature record.
    pub bias_stations_unmatched: usize,
    pub rows_zeroed_already_corrected: usize,
    pub rows_zeroed_country_level: usize,
    pub cells_adjusted: usize,
}

impl CorrectionSummary {
    pub fn summary(&self) -> String {
        format!(
            "=== Exposure Bias Correction ===\n\
            Temperature rows: {} ({} outside year range dropped)\n\
            Stations: {} ({} corrected, {} passed through)\n\
            Bias-model stations without temperatures: {}\n\
            Bias rows zeroed (already corrected): {}\n\
            Bias rows zeroed (country-level estimate): {}\n\
            Non-zero corrections applied: {}",
            self.temperature_rows,
            self.rows_trimmed,
            self.stations_total,
            self.stations_corrected,
            self.stations_passed_through,
            self.bias_stations_unmatched,
            self.rows_zeroed_already_corrected,
            self.rows_zeroed_country_level,
            self.cells_adjusted
        )
    }
}

#[derive(Debug, Clone)]
pub struct CorrectionOutput {
    pub tables: CorrectionTables,
    pub summary: CorrectionSummary,
}

/// Runs alignment then application over a whole temperature table.
pub struct CorrectionPipeline {
    config: CorrectionConfig,
}

impl CorrectionPipeline {
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    pub fn run(
        &self,
        temperatures: &TemperatureTable,
        model: &BiasModel,
        progress: Option<&ProgressReporter>,
    ) -> Result<CorrectionOutput> {
        let trimmed = temperatures.trimmed(&self.config.year_range);
        let groups = trimmed.group_by_station();
        let by_station = model.by_station();

        info!(
            "Correcting {} rows from {} stations ({} bias rows over {} stations)",
            trimmed.len(),
            groups.len(),
            model.len(),
            by_station.len()
        );

        let aligner = BiasAligner::new(self.config.zero_out.clone());
        let mut aligned: HashMap<String, AlignedBiasSeries> = HashMap::new();

        for group in &groups {
            if let Some(progress) = progress {
                progress.increment(1);
            }

            let Some(rows) = by_station.get(group.code.as_str()) else {
                continue;
            };
            let Some(range) = group.year_range(&trimmed) else {
                continue;
            };

            debug!(
                "Aligning {} bias rows for station {} onto {}-{}",
                rows.len(),
                group.code,
                range.start,
                range.end
            );
            aligned.insert(group.code.clone(), aligner.align(&group.code, rows, range)?);
        }

        let tables = BiasApplicator::new().apply(&trimmed, &aligned)?;

        let (already_corrected, country_level) = model.count_zero_outs(aligner.rules());
        let cells_adjusted = tables
            .corrections
            .iter()
            .flat_map(|r| r.values.iter())
            .filter(|v| matches!(v, Some(c) if *c != 0.0))
            .count();

        let summary = CorrectionSummary {
            temperature_rows: temperatures.len(),
            rows_trimmed: temperatures.len() - trimmed.len(),
            stations_total: groups.len(),
            stations_corrected: aligned.len(),
            stations_passed_through: groups.len() - aligned.len(),
            bias_stations_unmatched: by_station
                .keys()
                .filter(|code| !aligned.contains_key(**code))
                .count(),
            rows_zeroed_already_corrected: already_corrected,
            rows_zeroed_country_level: country_level,
            cells_adjusted,
        };

        info!(
            "Corrected {} stations, {} passed through, {} non-zero corrections",
            summary.stations_corrected, summary.stations_passed_through, summary.cells_adjusted
        );

        Ok(CorrectionOutput { tables, summary })
    }
}

impl Default for CorrectionPipeline {
    fn default() -> Self {
        Self::new(CorrectionConfig::default())
    }
}
