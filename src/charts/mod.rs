//! Charts module - Static figures, histograms and arrow heads

mod figure;
mod geometry;
mod style;

pub use figure::{Figure, LineStyle};
pub use geometry::{arrow_head_between_points, hist_norm, ArrowHead, Histogram};
pub use style::{PlotStyle, PlotType, PALETTE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Unknown plot type: {0}")]
    UnknownPlotType(String),
    #[error("No data to plot")]
    EmptyData,
    #[error("The number of bins must be positive")]
    InvalidBins,
    #[error("Invalid range: [{0}, {1}]")]
    InvalidRange(f64, f64),
    #[error("Arrow points coincide; no direction")]
    CoincidentPoints,
    #[error("Length mismatch: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },
}
