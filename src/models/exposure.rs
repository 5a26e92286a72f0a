use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::SourceFlag;

/// Thermometer housing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExposureCategory {
    Closed,
    ClosedRoof,
    Intermediate,
    Miscellaneous,
    Open,
    OpenWall,
    StevensonScreen,
    StevensonScreenRoof,
    TransitionMontsouris,
    TransitionStevensonTypeScreen,
    TransitionWildHut,
    Unknown,
    Wall,
}

impl ExposureCategory {
    pub const ALL: [ExposureCategory; 13] = [
        ExposureCategory::Closed,
        ExposureCategory::ClosedRoof,
        ExposureCategory::Intermediate,
        ExposureCategory::Miscellaneous,
        ExposureCategory::Open,
        ExposureCategory::OpenWall,
        ExposureCategory::StevensonScreen,
        ExposureCategory::StevensonScreenRoof,
        ExposureCategory::TransitionMontsouris,
        ExposureCategory::TransitionStevensonTypeScreen,
        ExposureCategory::TransitionWildHut,
        ExposureCategory::Unknown,
        ExposureCategory::Wall,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExposureCategory::Closed => "Closed",
            ExposureCategory::ClosedRoof => "Closed Roof",
            ExposureCategory::Intermediate => "Intermediate",
            ExposureCategory::Miscellaneous => "Miscellaneous",
            ExposureCategory::Open => "Open",
            ExposureCategory::OpenWall => "Open/Wall",
            ExposureCategory::StevensonScreen => "Stevenson screen",
            ExposureCategory::StevensonScreenRoof => "Stevenson screen Roof",
            ExposureCategory::TransitionMontsouris => "Transition Montsouris",
            ExposureCategory::TransitionStevensonTypeScreen => "Transition Stevenson-type screen",
            ExposureCategory::TransitionWildHut => "Transition Wild hut",
            ExposureCategory::Unknown => "Unknown",
            ExposureCategory::Wall => "Wall",
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            ExposureCategory::TransitionMontsouris
                | ExposureCategory::TransitionStevensonTypeScreen
                | ExposureCategory::TransitionWildHut
        )
    }

    /// Parse an optional label column; empty cells and `nan` are absent.
    pub fn parse_optional(label: Option<&str>) -> Result<Option<Self>> {
        match label.map(str::trim) {
            None | Some("") => Ok(None),
            Some(l) if l.eq_ignore_ascii_case("nan") => Ok(None),
            Some(l) => l.parse().map(Some),
        }
    }
}

impl FromStr for ExposureCategory {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ExposureCategory::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ProcessingError::UnknownExposureCategory(trimmed.to_string()))
    }
}

impl fmt::Display for ExposureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Station exposure history row, one per station-year.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureMetadataRecord {
    pub station_code: String,
    pub year: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    /// Free-text housing description, finer grained than the category.
    pub exposure: Option<String>,
    pub exposure_category: Option<ExposureCategory>,
    pub source_flag: Option<SourceFlag>,
    pub exposure_corrected: bool,
}
