pub mod bias;
pub mod exposure;
pub mod land_mask;
pub mod station;
pub mod table;
pub mod temperature;

pub use bias::{BiasModel, SourceFlag, StationBiasRecord, ZeroOutReason};
pub use exposure::{ExposureCategory, ExposureMetadataRecord};
pub use land_mask::LandMask;
pub use station::{normalize_station_code, CrutemHeader, StationMetadata};
pub use table::{StationRows, TemperatureTable};
pub use temperature::{month_index, present, MonthlyValues, StationTemperatureRecord};
