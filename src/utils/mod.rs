pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{generate_default_output_dir, table_path};
pub use progress::ProgressReporter;
