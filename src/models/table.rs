use std::collections::HashMap;

use crate::config::YearRange;
use crate::models::StationTemperatureRecord;
use crate::utils::constants::MONTHS_PER_YEAR;

/// Row indices of one station inside a [`TemperatureTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationRows {
    pub code: String,
    pub indices: Vec<usize>,
}

impl StationRows {
    /// Inclusive span of years covered by these rows.
    pub fn year_range(&self, table: &TemperatureTable) -> Option<YearRange> {
        let years = self.indices.iter().map(|&i| table.rows[i].year);
        let start = years.clone().min()?;
        let end = years.max()?;
        Some(YearRange::new(start, end))
    }
}

/// Station-year table of monthly values.
///
/// Used for raw temperatures, corrected temperatures and the
/// correction-only deltas. Tables are never modified in place; every
/// transformation returns a new table with the same row ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureTable {
    rows: Vec<StationTemperatureRecord>,
}

impl TemperatureTable {
    pub fn new(rows: Vec<StationTemperatureRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[StationTemperatureRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StationTemperatureRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StationTemperatureRecord> {
        self.rows.iter()
    }

    /// Group row indices by station code, in order of first appearance.
    pub fn group_by_station(&self) -> Vec<StationRows> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<StationRows> = Vec::new();

        for (i, row) in self.rows.iter().enumerate() {
            let code = row.station_code();
            match positions.get(code) {
                Some(&position) => groups[position].indices.push(i),
                None => {
                    positions.insert(code, groups.len());
                    groups.push(StationRows {
                        code: code.to_string(),
                        indices: vec![i],
                    });
                }
            }
        }

        groups
    }

    pub fn station_codes(&self) -> Vec<String> {
        self.group_by_station().into_iter().map(|g| g.code).collect()
    }

    /// Keep only rows whose year falls inside `range`.
    pub fn trimmed(&self, range: &YearRange) -> Self {
        Self::new(
            self.rows
                .iter()
                .filter(|r| range.contains(r.year))
                .cloned()
                .collect(),
        )
    }

    /// Same rows with every monthly value set to 0.0.
    pub fn zeros_like(&self) -> Self {
        Self::new(
            self.rows
                .iter()
                .map(|r| r.with_values([Some(0.0); MONTHS_PER_YEAR]))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a TemperatureTable {
    type Item = &'a StationTemperatureRecord;
    type IntoIter = std::slice::Iter<'a, StationTemperatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
