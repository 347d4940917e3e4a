//! Solar module - solar energy estimates and solar-panel data

pub mod energy;
pub mod panels;

pub use energy::{
    cloud_power_from_rain_means, cloud_power_from_rain_medians, cloud_powers_from_rain_means,
    cloud_powers_from_rain_medians, solar_power_from_true_sky,
};
pub use panels::{read_detailed_log, write_day_file, PanelSpecs, ReadOptions};

use crate::numerics::FormatError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarError {
    #[error("Length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),
    #[error("Invalid or non-existent local time: {0}")]
    Time(String),
    #[error("Expected a datetime column, got {0}")]
    NotDatetime(String),
}
