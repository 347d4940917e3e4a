//! Data module - tabular helpers on top of polars

mod columns;
mod formatted;

pub use columns::{column_f64, column_strings, is_numeric, numeric_columns};
pub use formatted::{csv_formatted_from_df, write_formatted};

use crate::numerics::FormatError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Format has {format} conversions but the frame has {columns} columns")]
    ColumnCount { format: usize, columns: usize },
}
