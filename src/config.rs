//! Run configuration.
//!
//! Values come from an optional TOML file, then `EXPOSURE_BIAS__*`
//! environment variables (e.g. `EXPOSURE_BIAS__AGGREGATION__LAT_STEP=10`),
//! then command line flags.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_END_YEAR, DEFAULT_EXPORT_END_YEAR, DEFAULT_LAT_STEP,
    DEFAULT_START_YEAR, DEGREES_OF_LATITUDE,
};

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct YearRange {
    #[validate(range(min = 1600, max = 2100))]
    pub start: i32,

    #[validate(range(min = 1600, max = 2100))]
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Number of years in the range, zero when `end < start`.
    pub fn years(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(DEFAULT_START_YEAR, DEFAULT_END_YEAR)
    }
}

/// Which bias rows are forced to zero before they are combined.
///
/// Rows flagged as already exposure corrected are always zeroed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroOutRules {
    /// Also zero rows whose estimate comes from country-level metadata.
    pub country_level_estimates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AggregationConfig {
    /// Zonal bin width in whole degrees; must divide 180.
    #[validate(range(min = 1.0, max = 90.0))]
    pub lat_step: f64,

    pub land_mask_path: Option<PathBuf>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            lat_step: DEFAULT_LAT_STEP,
            land_mask_path: None,
        }
    }
}

/// Metadata column compared between consecutive years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointField {
    /// The closed set of exposure categories.
    #[default]
    Category,
    /// The free-text exposure description.
    Exposure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakpointConfig {
    pub field: BreakpointField,
    pub include_country_level: bool,
    pub include_transitions: bool,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            field: BreakpointField::Category,
            include_country_level: true,
            include_transitions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Temperature rows outside this range are dropped before correction.
    #[validate(nested)]
    pub year_range: YearRange,

    pub zero_out: ZeroOutRules,

    #[validate(nested)]
    pub aggregation: AggregationConfig,

    pub breakpoints: BreakpointConfig,

    /// Years written to CRUTEM exports.
    #[validate(nested)]
    pub export: YearRange,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            year_range: YearRange::default(),
            zero_out: ZeroOutRules::default(),
            aggregation: AggregationConfig::default(),
            breakpoints: BreakpointConfig::default(),
            export: YearRange::new(DEFAULT_START_YEAR, DEFAULT_EXPORT_END_YEAR),
        }
    }
}

impl CorrectionConfig {
    /// Load from an optional file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: CorrectionConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field-level validation plus the cross-field constraints.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        for (name, range) in [("year_range", &self.year_range), ("export", &self.export)] {
            if range.end < range.start {
                return Err(ProcessingError::Config(format!(
                    "{}: end year {} is before start year {}",
                    name, range.end, range.start
                )));
            }
        }

        check_lat_step(self.aggregation.lat_step)
    }
}

/// Bins are built from whole one-degree rows of the land mask, so the
/// step must be integral and tile the full latitude axis.
pub fn check_lat_step(lat_step: f64) -> Result<()> {
    let degrees = DEGREES_OF_LATITUDE as f64;
    if lat_step < 1.0 || lat_step > degrees || lat_step.fract() != 0.0 || degrees % lat_step != 0.0
    {
        return Err(ProcessingError::Config(format!(
            "lat_step must be a whole number of degrees dividing 180, got {}",
            lat_step
        )));
    }
    Ok(())
}
