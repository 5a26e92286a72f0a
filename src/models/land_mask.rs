use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEGREES_OF_LATITUDE;

/// Gridded fractional land cover (percent) on a 1° latitude grid.
///
/// Rows are stored in the order they were supplied. Consumers ask for
/// [`LandMask::zonal_land_fraction_per_degree`], which places each row
/// by its own latitude so the result always runs south to north.
#[derive(Debug, Clone, PartialEq)]
pub struct LandMask {
    latitudes: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl LandMask {
    /// Missing (NaN) cells are filled with 0.0.
    pub fn new(latitudes: Vec<f64>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if latitudes.len() != rows.len() {
            return Err(ProcessingError::InvalidLandMask(format!(
                "{} latitudes but {} grid rows",
                latitudes.len(),
                rows.len()
            )));
        }

        if latitudes.len() < 2 {
            return Err(ProcessingError::InvalidLandMask(
                "at least two latitude rows are required".to_string(),
            ));
        }

        if let Some(bad) = latitudes.iter().find(|lat| !(-90.0..=90.0).contains(*lat)) {
            return Err(ProcessingError::InvalidLandMask(format!(
                "latitude {} is outside -90..90",
                bad
            )));
        }

        let mut sorted = latitudes.clone();
        sorted.sort_by(f64::total_cmp);
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ProcessingError::InvalidLandMask(format!(
                "latitude {} appears more than once",
                pair[0]
            )));
        }

        let mut filled = Vec::with_capacity(rows.len());
        for (latitude, row) in latitudes.iter().zip(rows) {
            if row.is_empty() {
                return Err(ProcessingError::InvalidLandMask(format!(
                    "latitude row {} has no cells",
                    latitude
                )));
            }

            let row: Vec<f64> = row
                .into_iter()
                .map(|v| if v.is_nan() { 0.0 } else { v })
                .collect();

            if let Some(bad) = row.iter().find(|v| !(0.0..=100.0).contains(*v)) {
                return Err(ProcessingError::InvalidLandMask(format!(
                    "land fraction {} at latitude {} is outside 0-100%",
                    bad, latitude
                )));
            }

            filled.push(row);
        }

        Ok(Self {
            latitudes,
            rows: filled,
        })
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn is_north_to_south(&self) -> bool {
        self.latitudes.first() > self.latitudes.last()
    }

    /// Mean land fraction (0-1) per degree of latitude, index 0 being the
    /// band [-90, -89].
    pub fn zonal_land_fraction_per_degree(&self) -> Result<Vec<f64>> {
        if self.rows.len() != DEGREES_OF_LATITUDE {
            return Err(ProcessingError::InvalidLandMask(format!(
                "expected {} one-degree latitude rows, found {}",
                DEGREES_OF_LATITUDE,
                self.rows.len()
            )));
        }

        let mut per_degree = vec![None; DEGREES_OF_LATITUDE];
        for (&latitude, row) in self.latitudes.iter().zip(&self.rows) {
            let band = (latitude + 90.0).floor();
            if !(0.0..DEGREES_OF_LATITUDE as f64).contains(&band) {
                return Err(ProcessingError::InvalidLandMask(format!(
                    "latitude {} has no one-degree band",
                    latitude
                )));
            }

            let slot = &mut per_degree[band as usize];
            if slot.is_some() {
                return Err(ProcessingError::InvalidLandMask(format!(
                    "more than one row falls in the band of latitude {}",
                    latitude
                )));
            }
            *slot = Some(row.iter().sum::<f64>() / row.len() as f64 / 100.0);
        }

        // 180 rows with no shared band fill every slot.
        Ok(per_degree.into_iter().flatten().collect())
    }
}
