use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::{YearRange, ZeroOutRules};
use crate::error::{ProcessingError, Result};
use crate::models::{
    month_index, present, BiasModel, CrutemHeader, MonthlyValues, TemperatureTable,
};
use crate::utils::constants::{CRUTEM_FIELD_WIDTH, CRUTEM_MISSING, CRUTEM_SCALE, MONTHS_PER_YEAR};

/// Scale a value to the CRUTEM integer representation, truncating toward
/// zero. Absent and NaN values become the `-999` fill.
pub fn format_crutem_value(value: Option<f64>) -> String {
    match present(value) {
        Some(v) => ((v * CRUTEM_SCALE).trunc() as i64).to_string(),
        None => CRUTEM_MISSING.to_string(),
    }
}

pub fn format_crutem_row(year: i32, values: &MonthlyValues) -> String {
    let mut row = year.to_string();
    for value in values {
        row.push_str(&format!(
            "{:>width$}",
            format_crutem_value(*value),
            width = CRUTEM_FIELD_WIDTH
        ));
    }
    row
}

/// Writes station blocks in the CRUTEM layout: the header line verbatim,
/// then one row per year of the export span.
pub struct CrutemWriter {
    span: YearRange,
    rules: ZeroOutRules,
}

impl CrutemWriter {
    pub fn new(span: YearRange) -> Self {
        Self {
            span,
            rules: ZeroOutRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ZeroOutRules) -> Self {
        self.rules = rules;
        self
    }

    /// Export a bias model. Each normalised bias row lands at its own
    /// calendar (year, month); stations without model rows are all fill.
    pub fn write_bias_model(
        &self,
        headers: &[CrutemHeader],
        model: &BiasModel,
        path: &Path,
    ) -> Result<()> {
        let grids = self.bias_grids(model)?;
        info!(
            "Exporting {} stations ({} with bias estimates) to {}",
            headers.len(),
            headers.iter().filter(|h| grids.contains_key(&h.code)).count(),
            path.display()
        );

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_blocks(&mut writer, headers, |code, year| {
            grids.get(code).and_then(|grid| grid.get(&year)).copied()
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Export a station-year table such as the corrected temperatures.
    pub fn write_table(
        &self,
        headers: &[CrutemHeader],
        table: &TemperatureTable,
        path: &Path,
    ) -> Result<()> {
        let mut rows: HashMap<&str, HashMap<i32, MonthlyValues>> = HashMap::new();
        for row in table {
            rows.entry(row.station_code())
                .or_default()
                .insert(row.year, row.values);
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_blocks(&mut writer, headers, |code, year| {
            rows.get(code).and_then(|years| years.get(&year)).copied()
        })?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_blocks<W, F>(&self, writer: &mut W, headers: &[CrutemHeader], lookup: F) -> Result<()>
    where
        W: Write,
        F: Fn(&str, i32) -> Option<MonthlyValues>,
    {
        for header in headers {
            writeln!(writer, "{}", header.line)?;
            for year in self.span.iter() {
                let values = lookup(&header.code, year).unwrap_or([None; MONTHS_PER_YEAR]);
                writeln!(writer, "{}", format_crutem_row(year, &values))?;
            }
        }

        debug!("Wrote {} station blocks", headers.len());
        Ok(())
    }

    fn bias_grids(&self, model: &BiasModel) -> Result<HashMap<String, HashMap<i32, MonthlyValues>>> {
        let mut grids: HashMap<String, HashMap<i32, MonthlyValues>> = HashMap::new();
        let mut seen = HashSet::new();

        for record in model.records() {
            let record = record.normalized(&self.rules);
            let (year, month) = (record.year(), record.month());
            if !self.span.contains(year) {
                continue;
            }

            if !seen.insert((record.station_code.clone(), year, month)) {
                return Err(ProcessingError::DuplicateBiasMonth {
                    station: record.station_code,
                    year,
                    month,
                });
            }

            let index = month_index(month)?;
            grids
                .entry(record.station_code)
                .or_default()
                .entry(year)
                .or_insert([None; MONTHS_PER_YEAR])[index] = record.bias;
        }

        Ok(grids)
    }
}
