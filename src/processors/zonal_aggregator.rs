use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::check_lat_step;
use crate::error::Result;
use crate::models::{LandMask, MonthlyValues, StationTemperatureRecord, TemperatureTable};
use crate::utils::constants::{DEGREES_OF_LATITUDE, MONTHS_PER_YEAR};

/// Latitude band `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZonalBin {
    pub lower: f64,
    pub upper: f64,
}

impl ZonalBin {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Half-open on the low end so a station on a boundary belongs to
    /// exactly one bin.
    pub fn contains(&self, latitude: f64) -> bool {
        latitude > self.lower && latitude <= self.upper
    }

    pub fn label(&self) -> String {
        format!("[{},{}]", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZonalWeight {
    pub bin: ZonalBin,
    /// |cos(latitude)| at the bin center.
    pub lat_weight: f64,
    /// Mean land fraction over the degrees the bin spans.
    pub land_weight: f64,
    pub weight: f64,
}

impl ZonalWeight {
    fn new(bin: ZonalBin, land_weight: f64) -> Self {
        let lat_weight = bin.center().to_radians().cos().abs();
        Self {
            bin,
            lat_weight,
            land_weight,
            weight: (lat_weight * land_weight).clamp(0.0, 1.0),
        }
    }
}

/// Combined area and land-fraction weights, per bin and per degree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalWeights {
    pub lat_step: f64,
    pub bins: Vec<ZonalWeight>,
    pub per_degree: Vec<ZonalWeight>,
}

impl ZonalWeights {
    pub fn compute(mask: &LandMask, lat_step: f64) -> Result<Self> {
        check_lat_step(lat_step)?;
        let land_per_degree = mask.zonal_land_fraction_per_degree()?;

        let per_degree = land_per_degree
            .iter()
            .enumerate()
            .map(|(i, &land)| {
                let lower = -90.0 + i as f64;
                ZonalWeight::new(
                    ZonalBin {
                        lower,
                        upper: lower + 1.0,
                    },
                    land,
                )
            })
            .collect();

        let step = lat_step as usize;
        let bins = (0..DEGREES_OF_LATITUDE / step)
            .map(|i| {
                let degrees = &land_per_degree[i * step..(i + 1) * step];
                let land = degrees.iter().sum::<f64>() / degrees.len() as f64;
                let lower = -90.0 + (i * step) as f64;
                ZonalWeight::new(
                    ZonalBin {
                        lower,
                        upper: lower + lat_step,
                    },
                    land,
                )
            })
            .collect();

        Ok(Self {
            lat_step,
            bins,
            per_degree,
        })
    }
}

/// Weighted annual mean correction for one latitude bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalCurve {
    pub bin: ZonalBin,
    pub weight: f64,
    pub stations: usize,
    pub rms: f64,
    pub series: BTreeMap<i32, f64>,
}

/// Per year, the mean of each month column over `rows`, skipping absent
/// cells. A month with no values stays `None`.
pub(crate) fn yearly_monthly_means<'a>(
    rows: impl Iterator<Item = &'a StationTemperatureRecord>,
) -> BTreeMap<i32, MonthlyValues> {
    let mut sums: BTreeMap<i32, ([f64; MONTHS_PER_YEAR], [usize; MONTHS_PER_YEAR])> =
        BTreeMap::new();

    for row in rows {
        let (total, count) = sums
            .entry(row.year)
            .or_insert(([0.0; MONTHS_PER_YEAR], [0; MONTHS_PER_YEAR]));
        for (m, value) in row.values.iter().enumerate() {
            if let Some(v) = value {
                total[m] += v;
                count[m] += 1;
            }
        }
    }

    sums.into_iter()
        .map(|(year, (total, count))| {
            let mut means = [None; MONTHS_PER_YEAR];
            for m in 0..MONTHS_PER_YEAR {
                if count[m] > 0 {
                    means[m] = Some(total[m] / count[m] as f64);
                }
            }
            (year, means)
        })
        .collect()
}

/// Mean of the present values, `None` when there are none.
pub(crate) fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

pub struct ZonalAggregator {
    weights: ZonalWeights,
}

impl ZonalAggregator {
    pub fn new(weights: ZonalWeights) -> Self {
        Self { weights }
    }

    pub fn from_mask(mask: &LandMask, lat_step: f64) -> Result<Self> {
        Ok(Self::new(ZonalWeights::compute(mask, lat_step)?))
    }

    pub fn weights(&self) -> &ZonalWeights {
        &self.weights
    }

    /// One curve per bin with contributing stations. Bins whose weighted
    /// series has zero RMS are left out.
    pub fn aggregate(&self, corrections: &TemperatureTable) -> Vec<ZonalCurve> {
        self.weights
            .bins
            .iter()
            .filter_map(|weight| self.aggregate_bin(weight, corrections))
            .collect()
    }

    fn aggregate_bin(&self, weight: &ZonalWeight, corrections: &TemperatureTable) -> Option<ZonalCurve> {
        let members = || {
            corrections
                .iter()
                .filter(move |r| weight.bin.contains(r.latitude()))
        };

        let series: BTreeMap<i32, f64> = yearly_monthly_means(members())
            .into_iter()
            .filter_map(|(year, means)| mean_present(&means).map(|m| (year, m * weight.weight)))
            .collect();

        if series.is_empty() {
            return None;
        }

        let rms = (series.values().map(|v| v * v).sum::<f64>() / series.len() as f64).sqrt();
        if rms == 0.0 {
            return None;
        }

        let mut stations: Vec<&str> = members().map(|r| r.station_code()).collect();
        stations.sort_unstable();
        stations.dedup();

        Some(ZonalCurve {
            bin: weight.bin,
            weight: weight.weight,
            stations: stations.len(),
            rms,
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationMetadata;
    use std::sync::Arc;

    fn uniform_mask(percent: f64) -> LandMask {
        let latitudes = (0..DEGREES_OF_LATITUDE).map(|i| -89.5 + i as f64).collect();
        let rows = (0..DEGREES_OF_LATITUDE).map(|_| vec![percent; 4]).collect();
        LandMask::new(latitudes, rows).unwrap()
    }

    fn correction_row(code: &str, latitude: f64, year: i32, value: f64) -> StationTemperatureRecord {
        let station = Arc::new(StationMetadata::new(
            code,
            "Station".to_string(),
            "XX".to_string(),
            latitude,
            0.0,
        ));
        StationTemperatureRecord::new(station, year, [Some(value); MONTHS_PER_YEAR])
    }

    #[test]
    fn test_bin_membership_is_half_open() {
        let low = ZonalBin { lower: 0.0, upper: 10.0 };
        let high = ZonalBin { lower: 10.0, upper: 20.0 };

        assert!(low.contains(10.0));
        assert!(!high.contains(10.0));
        assert!(!low.contains(0.0));
        assert_eq!(low.center(), 5.0);
    }

    #[test]
    fn test_weights_are_bounded() {
        let weights = ZonalWeights::compute(&uniform_mask(100.0), 5.0).unwrap();

        assert_eq!(weights.bins.len(), 36);
        assert_eq!(weights.per_degree.len(), 180);
        for w in weights.bins.iter().chain(weights.per_degree.iter()) {
            assert!((0.0..=1.0).contains(&w.weight));
            assert!((w.weight - w.lat_weight * w.land_weight).abs() < 1e-12);
        }

        let equator = weights.bins.iter().find(|w| w.bin.lower == 0.0).unwrap();
        assert!((equator.lat_weight - 2.5_f64.to_radians().cos()).abs() < 1e-12);
        assert_eq!(equator.land_weight, 1.0);
    }

    #[test]
    fn test_land_weight_uses_bin_degrees() {
        // Land only between 10N and 20N.
        let latitudes = (0..DEGREES_OF_LATITUDE).map(|i| -89.5 + i as f64).collect();
        let rows = (0..DEGREES_OF_LATITUDE)
            .map(|i| if (100..110).contains(&i) { vec![80.0] } else { vec![0.0] })
            .collect();
        let mask = LandMask::new(latitudes, rows).unwrap();

        let weights = ZonalWeights::compute(&mask, 10.0).unwrap();
        let bin = weights.bins.iter().find(|w| w.bin.lower == 10.0).unwrap();
        assert!((bin.land_weight - 0.8).abs() < 1e-12);
        let below = weights.bins.iter().find(|w| w.bin.lower == 0.0).unwrap();
        assert_eq!(below.land_weight, 0.0);
    }

    #[test]
    fn test_invalid_step_rejected() {
        assert!(ZonalWeights::compute(&uniform_mask(50.0), 7.0).is_err());
    }

    #[test]
    fn test_boundary_stations_counted_once() {
        let table = TemperatureTable::new(vec![
            correction_row("000001", 10.0, 1900, 0.2),
            correction_row("000002", 10.0, 1900, 0.4),
        ]);

        let aggregator = ZonalAggregator::from_mask(&uniform_mask(100.0), 10.0).unwrap();
        let curves = aggregator.aggregate(&table);

        assert_eq!(curves.len(), 1);
        let curve = &curves[0];
        assert_eq!(curve.bin, ZonalBin { lower: 0.0, upper: 10.0 });
        assert_eq!(curve.stations, 2);
        let expected = 0.3 * curve.weight;
        assert!((curve.series[&1900] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_bins_excluded() {
        let table = TemperatureTable::new(vec![
            correction_row("000001", 45.0, 1900, 0.0),
            correction_row("000002", -45.0, 1900, -0.1),
        ]);

        let aggregator = ZonalAggregator::from_mask(&uniform_mask(50.0), 10.0).unwrap();
        let curves = aggregator.aggregate(&table);

        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].bin.upper, -40.0);
        assert!(curves[0].series[&1900] < 0.0);
    }

    #[test]
    fn test_annual_mean_of_monthly_means() {
        let mut row = correction_row("000001", 55.0, 1900, 0.0);
        row.values[0] = Some(1.2);
        let other = correction_row("000002", 55.0, 1900, 0.0);
        let table = TemperatureTable::new(vec![row, other]);

        let means = yearly_monthly_means(table.iter());
        assert_eq!(means[&1900][0], Some(0.6));
        let annual = mean_present(&means[&1900]).unwrap();
        assert!((annual - 0.05).abs() < 1e-12);
    }
}
