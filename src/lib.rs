//! Exposure bias correction for historical land-surface temperature
//! station records.
//!
//! A bias model gives, per station and month, the estimated warm bias of
//! pre-screen thermometer exposures. [`processors::BiasAligner`] maps a
//! station's bias rows onto its temperature calendar and
//! [`processors::BiasApplicator`] adds them, producing a corrected table
//! and a correction-only table. [`processors::ZonalAggregator`] reduces
//! the corrections to area-weighted latitude-band curves.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::CorrectionConfig;
pub use error::{ProcessingError, Result};
