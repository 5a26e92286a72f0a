use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::models::{StationTemperatureRecord, TemperatureTable};
use crate::utils::constants::MONTHS_PER_YEAR;

const STATION_COLUMNS: [&str; 9] = [
    "stationcode",
    "stationlat",
    "stationlon",
    "stationelevation",
    "stationname",
    "stationcountry",
    "stationfirstyear",
    "stationlastyear",
    "stationsource",
];

/// Writes station-year tables as CSV in the layout the temperature
/// reader accepts. Absent values become empty cells.
pub struct TableWriter;

impl TableWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_table(&self, table: &TemperatureTable, path: &Path) -> Result<()> {
        self.write_to(table, File::create(path)?)?;
        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(&self, table: &TemperatureTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["year".to_string()];
        header.extend((1..=MONTHS_PER_YEAR).map(|m| m.to_string()));
        header.extend(STATION_COLUMNS.iter().map(|c| c.to_string()));
        csv_writer.write_record(&header)?;

        for row in table {
            csv_writer.write_record(&Self::record(row))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn record(row: &StationTemperatureRecord) -> Vec<String> {
        let station = &row.station;
        let mut record = Vec::with_capacity(1 + MONTHS_PER_YEAR + STATION_COLUMNS.len());

        record.push(row.year.to_string());
        record.extend(row.values.iter().map(|v| optional(*v)));
        record.push(station.code.clone());
        record.push(station.latitude.to_string());
        record.push(station.longitude.to_string());
        record.push(optional(station.elevation));
        record.push(station.name.clone());
        record.push(station.country.clone());
        record.push(optional(station.first_year));
        record.push(optional(station.last_year));
        record.push(station.source.clone().unwrap_or_default());

        record
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
