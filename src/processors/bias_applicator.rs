use std::collections::{HashMap, HashSet};

use crate::error::{ProcessingError, Result};
use crate::models::TemperatureTable;
use crate::processors::AlignedBiasSeries;
use crate::utils::constants::MONTHS_PER_YEAR;

/// Corrected temperatures and the corrections that were added to them.
/// Both tables have the row count and ordering of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionTables {
    pub corrected: TemperatureTable,
    pub corrections: TemperatureTable,
}

/// Adds aligned bias series onto a temperature table.
///
/// Performs no I/O. Absent bias values count as 0.0 here and nowhere
/// earlier.
pub struct BiasApplicator;

impl BiasApplicator {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        temperatures: &TemperatureTable,
        aligned: &HashMap<String, AlignedBiasSeries>,
    ) -> Result<CorrectionTables> {
        let rows = temperatures.rows();
        let mut corrected: Vec<_> = rows.to_vec();
        let mut corrections = temperatures.zeros_like().into_rows();

        for group in temperatures.group_by_station() {
            let Some(series) = aligned.get(&group.code) else {
                continue;
            };

            let Some(range) = group.year_range(temperatures) else {
                continue;
            };

            let mut years = HashSet::with_capacity(group.indices.len());
            for &i in &group.indices {
                if !years.insert(rows[i].year) {
                    return Err(ProcessingError::DuplicateStationYear {
                        station: group.code.clone(),
                        year: rows[i].year,
                    });
                }
            }

            let expected = range.years() * MONTHS_PER_YEAR;
            if series.len() != expected {
                return Err(ProcessingError::StructuralMismatch {
                    station: group.code.clone(),
                    expected,
                    found: series.len(),
                });
            }
            if series.start_year() != range.start {
                return Err(ProcessingError::MisalignedStart {
                    station: group.code.clone(),
                    expected: range.start,
                    found: series.start_year(),
                });
            }

            // Each month column is matched on (year, month) independently.
            for month in 1..=MONTHS_PER_YEAR as u32 {
                let column = month as usize - 1;
                for &i in &group.indices {
                    let bias = series.get(rows[i].year, month).unwrap_or(0.0);
                    corrected[i].values[column] = rows[i].values[column].map(|t| t + bias);
                    corrections[i].values[column] =
                        corrections[i].values[column].map(|c| c + bias);
                }
            }
        }

        Ok(CorrectionTables {
            corrected: TemperatureTable::new(corrected),
            corrections: TemperatureTable::new(corrections),
        })
    }
}

impl Default for BiasApplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StationMetadata, StationTemperatureRecord};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn table(code: &str, years: &[i32]) -> TemperatureTable {
        let station = Arc::new(StationMetadata::new(
            code,
            "Test Station".to_string(),
            "UK".to_string(),
            51.8,
            -1.3,
        ));
        TemperatureTable::new(
            years
                .iter()
                .map(|&year| {
                    let mut values = [None; MONTHS_PER_YEAR];
                    for (m, v) in values.iter_mut().enumerate() {
                        *v = Some(year as f64 / 100.0 + m as f64);
                    }
                    StationTemperatureRecord::new(Arc::clone(&station), year, values)
                })
                .collect(),
        )
    }

    fn series(code: &str, start_year: i32, years: usize, bias: f64) -> AlignedBiasSeries {
        AlignedBiasSeries::from_values(code, start_year, vec![Some(bias); years * MONTHS_PER_YEAR])
    }

    #[test]
    fn test_unsorted_rows_match_by_year() {
        let temperatures = table("036456", &[1902, 1900, 1901]);
        let mut values = vec![None; 3 * MONTHS_PER_YEAR];
        // 1901, month 3
        values[MONTHS_PER_YEAR + 2] = Some(0.42);
        let aligned = HashMap::from([(
            "036456".to_string(),
            AlignedBiasSeries::from_values("036456", 1900, values),
        )]);

        let tables = BiasApplicator::new().apply(&temperatures, &aligned).unwrap();

        let row_1901 = &tables.corrected.rows()[2];
        assert_eq!(row_1901.year, 1901);
        assert_eq!(
            row_1901.values[2],
            temperatures.rows()[2].values[2].map(|t| t + 0.42)
        );
        assert_eq!(tables.corrections.rows()[2].values[2], Some(0.42));
        assert_eq!(tables.corrected.rows()[0], temperatures.rows()[0]);
        assert_eq!(tables.corrected.rows()[1], temperatures.rows()[1]);
    }

    #[test]
    fn test_missing_temperatures_stay_missing() {
        let mut temperatures = table("036456", &[1900]).into_rows();
        temperatures[0].values[0] = None;
        let temperatures = TemperatureTable::new(temperatures);
        let aligned = HashMap::from([("036456".to_string(), series("036456", 1900, 1, 0.5))]);

        let tables = BiasApplicator::new().apply(&temperatures, &aligned).unwrap();
        assert_eq!(tables.corrected.rows()[0].values[0], None);
        assert_eq!(tables.corrections.rows()[0].values[0], Some(0.5));
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        let temperatures = table("036456", &[1900, 1901]);
        let aligned = HashMap::from([("036456".to_string(), series("036456", 1900, 1, 0.5))]);

        let result = BiasApplicator::new().apply(&temperatures, &aligned);
        match result {
            Err(ProcessingError::StructuralMismatch {
                station,
                expected,
                found,
            }) => {
                assert_eq!(station, "036456");
                assert_eq!(expected, 24);
                assert_eq!(found, 12);
            }
            other => panic!("expected structural mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_anchor_fails_fast() {
        let temperatures = table("036456", &[1900, 1901]);
        let aligned = HashMap::from([("036456".to_string(), series("036456", 1899, 2, 0.5))]);

        let err = BiasApplicator::new()
            .apply(&temperatures, &aligned)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::MisalignedStart {
                expected: 1900,
                found: 1899,
                ..
            }
        ));
        assert!(err.to_string().contains("starts in 1899"));
    }

    #[test]
    fn test_duplicate_station_year_rejected() {
        let temperatures = table("036456", &[1900, 1900]);
        let aligned = HashMap::from([("036456".to_string(), series("036456", 1900, 1, 0.5))]);

        assert!(matches!(
            BiasApplicator::new().apply(&temperatures, &aligned),
            Err(ProcessingError::DuplicateStationYear { year: 1900, .. })
        ));
    }

    #[test]
    fn test_gap_years_are_covered_by_span() {
        let temperatures = table("036456", &[1900, 1902]);
        let aligned = HashMap::from([("036456".to_string(), series("036456", 1900, 3, 0.25))]);

        let tables = BiasApplicator::new().apply(&temperatures, &aligned).unwrap();
        assert!(tables
            .corrections
            .iter()
            .all(|r| r.values.iter().all(|v| *v == Some(0.25))));
    }
}
