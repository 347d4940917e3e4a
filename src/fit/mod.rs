//! Fit module - least-squares fitting, fit-quality statistics and spline interpolation

mod curvefit;
pub mod linalg;
mod polyfit;
mod quality;
mod spline;

pub use curvefit::{curve_fit_chi2, CurveFit, LmOptions};
pub use polyfit::{np_polyfit_chi2, polyfit, polyval, PolyFit};
pub use quality::{Deviation, FitModel, FitPoint, FitQuality, ReportDetail, ReportOptions};
pub use spline::CubicSpline;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Length mismatch: {what} has {got} values, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Too few data points: {points} points for {coefs} coefficients")]
    TooFewPoints { points: usize, coefs: usize },
    #[error("All y sigmas must be positive and finite")]
    InvalidSigma,
    #[error("Input contains non-finite values")]
    NonFinite,
    #[error("Matrix is singular")]
    Singular,
    #[error("Design matrix is rank deficient")]
    RankDeficient,
    #[error("Fit did not converge after {evaluations} function evaluations")]
    NotConverged { evaluations: usize },
    #[error("x values must be given for this fit model")]
    MissingX,
    #[error("x values must be strictly increasing")]
    NotIncreasing,
}

pub(crate) fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), FitError> {
    if expected != got {
        return Err(FitError::LengthMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

pub(crate) fn check_sigmas(sigmas: Option<&[f64]>, n: usize) -> Result<(), FitError> {
    if let Some(s) = sigmas {
        check_len("ysigmas", n, s.len())?;
        if s.iter().any(|&v| !(v > 0.0 && v.is_finite())) {
            return Err(FitError::InvalidSigma);
        }
    }
    Ok(())
}
