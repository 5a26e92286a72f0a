use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{MonthlyValues, TemperatureTable};
use crate::processors::zonal_aggregator::{mean_present, yearly_monthly_means};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    /// The equator belongs to the northern hemisphere.
    pub fn contains(&self, latitude: f64) -> bool {
        match self {
            Hemisphere::Northern => latitude >= 0.0,
            Hemisphere::Southern => latitude < 0.0,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Hemisphere::Northern => "NH",
            Hemisphere::Southern => "SH",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Unweighted station mean of a correction table over one hemisphere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HemisphericMean {
    pub hemisphere: Hemisphere,
    pub monthly: BTreeMap<i32, MonthlyValues>,
    /// Mean of the twelve monthly means; `None` when every month is absent.
    pub annual: BTreeMap<i32, Option<f64>>,
}

impl HemisphericMean {
    pub fn compute(hemisphere: Hemisphere, corrections: &TemperatureTable) -> Self {
        let monthly = yearly_monthly_means(
            corrections
                .iter()
                .filter(|r| hemisphere.contains(r.latitude())),
        );
        let annual = monthly
            .iter()
            .map(|(&year, means)| (year, mean_present(means)))
            .collect();

        Self {
            hemisphere,
            monthly,
            annual,
        }
    }
}

/// Northern then southern hemisphere means.
pub fn hemispheric_means(corrections: &TemperatureTable) -> Vec<HemisphericMean> {
    [Hemisphere::Northern, Hemisphere::Southern]
        .into_iter()
        .map(|h| HemisphericMean::compute(h, corrections))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StationMetadata, StationTemperatureRecord};
    use crate::utils::constants::MONTHS_PER_YEAR;
    use std::sync::Arc;

    fn row(latitude: f64, year: i32, values: MonthlyValues) -> StationTemperatureRecord {
        let station = Arc::new(StationMetadata::new(
            "000001",
            "Station".to_string(),
            "XX".to_string(),
            latitude,
            0.0,
        ));
        StationTemperatureRecord::new(station, year, values)
    }

    #[test]
    fn test_equator_is_northern() {
        assert!(Hemisphere::Northern.contains(0.0));
        assert!(!Hemisphere::Southern.contains(0.0));
        assert!(Hemisphere::Southern.contains(-0.1));
    }

    #[test]
    fn test_hemispheric_means() {
        let table = TemperatureTable::new(vec![
            row(0.0, 1900, [Some(0.2); MONTHS_PER_YEAR]),
            row(40.0, 1900, [Some(0.4); MONTHS_PER_YEAR]),
            row(-20.0, 1900, [None; MONTHS_PER_YEAR]),
            row(-20.0, 1901, [Some(-0.1); MONTHS_PER_YEAR]),
        ]);

        let means = hemispheric_means(&table);
        assert_eq!(means.len(), 2);

        let north = &means[0];
        assert_eq!(north.hemisphere, Hemisphere::Northern);
        let jan = north.monthly[&1900][0].unwrap();
        assert!((jan - 0.3).abs() < 1e-12);
        assert!((north.annual[&1900].unwrap() - 0.3).abs() < 1e-12);
        assert!(!north.annual.contains_key(&1901));

        let south = &means[1];
        assert_eq!(south.annual[&1900], None);
        assert!((south.annual[&1901].unwrap() - -0.1).abs() < 1e-12);
    }
}
