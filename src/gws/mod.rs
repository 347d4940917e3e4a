//! Gravitational-wave module - Newtonian compact-binary waveforms and detector noise curves

mod noise;
mod waveform;

pub use noise::{noise_curve, Interferometer};
pub use waveform::{cbc_waveform, cbc_waveform_frequency, Binary};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GwError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
