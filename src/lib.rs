//! Sluyspy - a personal collection of scientific helper functions
//!
//! Least-squares fitting and fit-quality reports, geodesy, gravitational-wave signals and
//! detector noise, weather and solar-energy data, classification statistics, polars helpers,
//! static plots and assorted system utilities.

pub mod charts;
pub mod config;
pub mod constants;
pub mod data;
pub mod earth;
pub mod fit;
pub mod gws;
pub mod html;
pub mod ml;
pub mod numerics;
pub mod solar;
pub mod system;
pub mod text;
pub mod weather;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to `default_level`.
///
/// Does nothing when a global subscriber is already set.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
