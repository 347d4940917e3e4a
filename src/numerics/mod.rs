//! Numerics module - machine constants, number formatting and grids

pub mod cformat;

pub use cformat::{sprintf, Arg, CFormat, FormatError};

/// Smallest value for which `1 + EPS != 1`: 2.220446049250313e-16.
pub const EPS: f64 = f64::EPSILON;

/// Smallest value larger than 1.
pub const EPS1: f64 = 1.0 + EPS;

/// Smallest value larger than 0: 4.9406564584124654e-324.
pub const TINY: f64 = 4.9406564584124654e-324;

/// Default number of significant digits for [`sigdig`], chosen to stay clear of machine rounding.
pub const SIGDIG_DEFAULT: usize = 14;

/// Return a number printed with (at most) `dig` significant digits.
///
/// Trailing zeros are not printed. The number is multiplied by [`EPS1`] first, so that e.g.
/// 0.075 with one digit becomes `0.08` rather than `0.07`.
pub fn sigdig(num: Option<f64>, dig: usize) -> String {
    match num {
        None => "None".to_string(),
        Some(v) => cformat::format_g(v * EPS1, dig),
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// `n` logarithmically spaced values from `start` to `stop` (both positive).
pub fn logspace10(start: f64, stop: f64, n: usize) -> Vec<f64> {
    linspace(start.log10(), stop.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}
