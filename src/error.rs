use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid source flag: {0}")]
    InvalidSourceFlag(u8),

    #[error("Unknown exposure category: '{0}'")]
    UnknownExposureCategory(String),

    #[error(
        "Structural mismatch for station {station}: expected {expected} aligned bias values, found {found}"
    )]
    StructuralMismatch {
        station: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "Structural mismatch for station {station}: aligned bias series starts in {found}, temperature record starts in {expected}"
    )]
    MisalignedStart {
        station: String,
        expected: i32,
        found: i32,
    },

    #[error("Station {station} has more than one bias estimate for relative year {year}, month {month}")]
    DuplicateBiasMonth { station: String, year: i32, month: u32 },

    #[error("Station {station} has more than one temperature row for year {year}")]
    DuplicateStationYear { station: String, year: i32 },

    #[error("Invalid land mask: {0}")]
    InvalidLandMask(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
