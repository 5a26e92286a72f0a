pub mod bias_model_reader;
pub mod crutem_reader;
pub mod exposure_metadata_reader;
pub mod land_mask_reader;
pub mod temperature_reader;

pub use bias_model_reader::{parse_timestamp, BiasModelReader};
pub use crutem_reader::CrutemReader;
pub use exposure_metadata_reader::ExposureMetadataReader;
pub use land_mask_reader::LandMaskReader;
pub use temperature_reader::TemperatureReader;
