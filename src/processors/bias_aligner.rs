use crate::config::{YearRange, ZeroOutRules};
use crate::error::{ProcessingError, Result};
use crate::models::{month_index, StationBiasRecord};
use crate::utils::constants::MONTHS_PER_YEAR;

/// Bias values for one station laid out on the calendar grid of that
/// station's temperature record: index `(year - start_year) * 12 + month - 1`.
///
/// Cells the bias model has no estimate for stay `None`; they are only
/// resolved to 0.0 when combined with temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedBiasSeries {
    station_code: String,
    start_year: i32,
    values: Vec<Option<f64>>,
}

impl AlignedBiasSeries {
    pub fn from_values(station_code: &str, start_year: i32, values: Vec<Option<f64>>) -> Self {
        Self {
            station_code: station_code.to_string(),
            start_year,
            values,
        }
    }

    pub fn station_code(&self) -> &str {
        &self.station_code
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Bias at a calendar cell; `None` when absent or outside the series.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let offset = year.checked_sub(self.start_year)?;
        if offset < 0 {
            return None;
        }
        let index = offset as usize * MONTHS_PER_YEAR + month_index(month).ok()?;
        self.values.get(index).copied().flatten()
    }
}

/// Re-anchors a station's bias rows onto its temperature record.
///
/// The absolute year in the model timestamps is not trusted: a row's
/// position is its year relative to the first year in the model for that
/// station, plus its own calendar month. Relative year 0 lands on the
/// first year of the temperature record.
pub struct BiasAligner {
    rules: ZeroOutRules,
}

impl BiasAligner {
    pub fn new(rules: ZeroOutRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ZeroOutRules {
        &self.rules
    }

    pub fn align(
        &self,
        station_code: &str,
        rows: &[&StationBiasRecord],
        target: YearRange,
    ) -> Result<AlignedBiasSeries> {
        if target.end < target.start {
            return Err(ProcessingError::InvalidFormat(format!(
                "Station {}: target year range {}-{} is empty",
                station_code, target.start, target.end
            )));
        }

        let mut values = vec![None; target.years() * MONTHS_PER_YEAR];
        let mut filled = vec![false; values.len()];

        let Some(anchor) = rows.iter().map(|r| r.year()).min() else {
            return Ok(AlignedBiasSeries::from_values(station_code, target.start, values));
        };

        for row in rows {
            let row = row.normalized(&self.rules);
            let relative_year = row.year() - anchor;
            let year = target.start + relative_year;

            // Model rows past the end of the temperature record have no cell.
            if year > target.end {
                continue;
            }

            let index = relative_year as usize * MONTHS_PER_YEAR + month_index(row.month())?;
            if filled[index] {
                return Err(ProcessingError::DuplicateBiasMonth {
                    station: station_code.to_string(),
                    year,
                    month: row.month(),
                });
            }

            filled[index] = true;
            values[index] = row.bias;
        }

        Ok(AlignedBiasSeries::from_values(station_code, target.start, values))
    }
}

impl Default for BiasAligner {
    fn default() -> Self {
        Self::new(ZeroOutRules::default())
    }
}
