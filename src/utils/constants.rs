/// Calendar constants
pub const MONTHS_PER_YEAR: usize = 12;
pub const DEGREES_OF_LATITUDE: usize = 180;

/// Station codes are zero-padded to this width
pub const STATION_CODE_WIDTH: usize = 6;

/// Default year ranges
pub const DEFAULT_START_YEAR: i32 = 1781;
pub const DEFAULT_END_YEAR: i32 = 2022;
pub const DEFAULT_EXPORT_END_YEAR: i32 = 2020;

/// Zonal aggregation
pub const DEFAULT_LAT_STEP: f64 = 5.0;

/// CRUTEM fixed-width format
pub const CRUTEM_SCALE: f64 = 1000.0;
pub const CRUTEM_MISSING: &str = "-999";
pub const CRUTEM_FIELD_WIDTH: usize = 5;
pub const CRUTEM_DATA_TOKENS: usize = 13;
pub const CRUTEM_YEAR_WIDTH: usize = 4;

/// Output file names
pub const CORRECTED_TABLE_FILE: &str = "temp_ebc";
pub const CORRECTION_TABLE_FILE: &str = "ebc";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "EXPOSURE_BIAS";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
