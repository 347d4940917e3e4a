//! Polynomial Fits

use super::linalg::lstsq;
use super::quality::{FitModel, FitQuality};
use super::{check_len, check_sigmas, FitError};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Result of [`np_polyfit_chi2`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    /// Coefficients, highest power first.
    pub coefs: Vec<f64>,
    pub red_chi2: f64,
    pub quality: FitQuality,
}

/// Evaluate a polynomial with coefficients given highest power first.
pub fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Weighted least-squares polynomial fit of degree `order`.
///
/// Points are weighted with 1/σ when sigmas are given. Coefficients are returned highest power
/// first, so they can be fed to [`polyval`] directly.
pub fn polyfit(
    x: &[f64],
    y: &[f64],
    order: usize,
    sigmas: Option<&[f64]>,
) -> Result<Vec<f64>, FitError> {
    let n = x.len();
    let ncoefs = order + 1;
    check_len("yvals", n, y.len())?;
    check_sigmas(sigmas, n)?;
    if n < ncoefs {
        return Err(FitError::TooFewPoints {
            points: n,
            coefs: ncoefs,
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let mut a = Array2::zeros((n, ncoefs));
    let mut b = Array1::zeros(n);
    for i in 0..n {
        let w = sigmas.map_or(1.0, |s| 1.0 / s[i]);
        for j in 0..ncoefs {
            a[[i, j]] = x[i].powi((order - j) as i32) * w;
        }
        b[i] = y[i] * w;
    }

    Ok(lstsq(&a, &b)?.to_vec())
}

/// Polynomial fit that also reports the reduced chi² and the full fit quality.
pub fn np_polyfit_chi2(
    x: &[f64],
    y: &[f64],
    order: usize,
    sigmas: Option<&[f64]>,
) -> Result<PolyFit, FitError> {
    let coefs = polyfit(x, y, order, sigmas)?;
    let quality = FitQuality::compute(FitModel::Polynomial(&coefs), Some(x), y, sigmas)?;
    debug!(
        order,
        points = x.len(),
        red_chi2 = quality.red_chi2,
        "Polynomial fit done"
    );

    Ok(PolyFit {
        red_chi2: quality.red_chi2,
        coefs,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_polyval() {
        assert_eq!(polyval(&[3.0, -2.0, 1.0], 2.0), 9.0);
        assert_eq!(polyval(&[], 2.0), 0.0);
    }

    #[test]
    fn test_exact_quadratic() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&x| 3.0 * x * x - 2.0 * x + 1.0).collect();
        let fit = np_polyfit_chi2(&x, &y, 2, None).unwrap();
        assert_abs_diff_eq!(fit.coefs[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefs[1], -2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefs[2], 1.0, epsilon = 1e-10);
        assert!(fit.red_chi2 < 1e-18);

        let sig = vec![0.5; 10];
        let weighted = polyfit(&x, &y, 2, Some(&sig)).unwrap();
        assert_abs_diff_eq!(weighted[0], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_line_with_residuals() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 1.0, 3.0];
        let fit = np_polyfit_chi2(&x, &y, 1, None).unwrap();
        assert_abs_diff_eq!(fit.coefs[0], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.coefs[1], -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.red_chi2, 0.35, epsilon = 1e-12);
        assert_eq!(fit.quality.max_abs_dev.x, Some(2.0));
    }

    #[test]
    fn test_high_order_stays_stable() {
        // Degree 11 on hours 0-47, as used for forecast smoothing
        let x: Vec<f64> = (0..48).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&h| 5.0 + 2.0 * (h / 8.0).sin()).collect();
        let coefs = polyfit(&x, &y, 11, None).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(polyval(&coefs, xi), yi, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_polyfit_errors() {
        assert!(matches!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0], 2, None),
            Err(FitError::TooFewPoints {
                points: 2,
                coefs: 3
            })
        ));
        assert!(matches!(
            polyfit(&[1.0, 2.0], &[1.0], 1, None),
            Err(FitError::LengthMismatch { .. })
        ));
        assert!(matches!(
            polyfit(&[1.0, f64::NAN], &[1.0, 2.0], 1, None),
            Err(FitError::NonFinite)
        ));
    }
}
