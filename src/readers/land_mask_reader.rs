use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::LandMask;

#[derive(Debug, Deserialize)]
struct RawMaskCell {
    lat: f64,
    lon: f64,
    #[serde(alias = "sftof", alias = "sftlf", alias = "value")]
    fraction: Option<f64>,
}

/// Reads a long-form `lat,lon,fraction` land mask grid.
///
/// Latitude rows keep the order in which they first appear in the file;
/// cells within a row are sorted by longitude.
pub struct LandMaskReader;

impl LandMaskReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_mask(&self, path: &Path) -> Result<LandMask> {
        debug!("Reading land mask {}", path.display());
        self.read_from(File::open(path)?)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<LandMask> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut latitudes: Vec<f64> = Vec::new();
        let mut rows: Vec<Vec<(f64, f64)>> = Vec::new();

        for result in csv_reader.deserialize::<RawMaskCell>() {
            let cell = result?;
            let value = cell.fraction.unwrap_or(f64::NAN);

            match latitudes.iter().position(|&lat| lat == cell.lat) {
                Some(i) => rows[i].push((cell.lon, value)),
                None => {
                    latitudes.push(cell.lat);
                    rows.push(vec![(cell.lon, value)]);
                }
            }
        }

        let width = rows.first().map(Vec::len).unwrap_or_default();
        if let Some((lat, row)) = latitudes.iter().zip(&rows).find(|(_, r)| r.len() != width) {
            return Err(ProcessingError::InvalidLandMask(format!(
                "latitude {} has {} cells, expected {}",
                lat,
                row.len(),
                width
            )));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.sort_by(|a, b| a.0.total_cmp(&b.0));
                row.into_iter().map(|(_, value)| value).collect()
            })
            .collect();

        let mask = LandMask::new(latitudes, rows)?;
        debug!(
            "Land mask has {} latitude rows of {} cells, supplied {}",
            mask.latitudes().len(),
            width,
            if mask.is_north_to_south() {
                "north to south"
            } else {
                "south to north"
            }
        );
        Ok(mask)
    }
}

impl Default for LandMaskReader {
    fn default() -> Self {
        Self::new()
    }
}
