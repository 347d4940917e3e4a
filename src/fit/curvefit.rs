//! Non-linear Least Squares
//! Levenberg-Marquardt fit of an arbitrary model function, with the covariance matrix scaled
//! by the reduced chi².

use super::linalg::{invert, solve};
use super::quality::{FitModel, FitQuality};
use super::{check_len, check_sigmas, FitError};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Square root of the machine epsilon; relative step for the numerical Jacobian.
const SQRT_EPS: f64 = 1.4901161193847656e-8;
const LAMBDA_START: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e16;

#[derive(Debug, Clone, PartialEq)]
pub struct LmOptions {
    /// Maximum number of model evaluations (per data set); default 200·(ncoefs + 1).
    pub max_evaluations: Option<usize>,
    /// Stop when chi² improves by less than this fraction.
    pub ftol: f64,
    /// Stop when the step is smaller than this fraction of the coefficient vector.
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_evaluations: None,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

/// Result of [`curve_fit_chi2`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit {
    pub coefs: Vec<f64>,
    /// Standard deviations of the coefficients, √diag(var_cov).
    pub dcoefs: Vec<f64>,
    pub chi2: f64,
    /// χ²/(n − m); NaN when there are no degrees of freedom.
    pub red_chi2: f64,
    /// Covariance matrix; infinite when there are no degrees of freedom.
    pub var_cov: Array2<f64>,
    pub evaluations: usize,
    pub iterations: usize,
    pub quality: FitQuality,
}

/// Fit `f(x, coefs)` to the data, starting at `coefs0`.
///
/// Residuals are weighted with 1/σ when sigmas are given. The covariance matrix is
/// (JᵀWJ)⁻¹·χ²_red, so the coefficient uncertainties reflect the actual scatter of the data.
pub fn curve_fit_chi2<F>(
    f: F,
    x: &[f64],
    y: &[f64],
    coefs0: &[f64],
    sigmas: Option<&[f64]>,
    opts: &LmOptions,
) -> Result<CurveFit, FitError>
where
    F: Fn(f64, &[f64]) -> f64 + Sync,
{
    let n = x.len();
    let m = coefs0.len();
    check_len("yvals", n, y.len())?;
    check_sigmas(sigmas, n)?;
    if m == 0 || n < m {
        return Err(FitError::TooFewPoints {
            points: n,
            coefs: m,
        });
    }

    let weights: Vec<f64> = (0..n).map(|i| sigmas.map_or(1.0, |s| 1.0 / s[i])).collect();
    let problem = Problem {
        f: &f,
        x,
        y,
        weights: &weights,
    };
    let max_evaluations = opts.max_evaluations.unwrap_or(200 * (m + 1));

    let mut p = coefs0.to_vec();
    let mut r = problem.residuals(&p);
    let mut evaluations = 1;
    let mut chi2 = sum_sq(&r);
    if !chi2.is_finite() {
        return Err(FitError::NonFinite);
    }

    let mut lambda = LAMBDA_START;
    let mut iterations = 0;
    'outer: loop {
        if evaluations >= max_evaluations {
            return Err(FitError::NotConverged { evaluations });
        }
        iterations += 1;

        let jac = problem.jacobian(&p, &r);
        evaluations += m;
        let jtj = jac.t().dot(&jac);
        let jtr = jac.t().dot(&r);
        if jtr.iter().all(|&g| g == 0.0) {
            break;
        }
        let neg_jtr = -&jtr;

        loop {
            let mut a = jtj.clone();
            for i in 0..m {
                let d = jtj[[i, i]];
                a[[i, i]] = d + lambda * if d > 0.0 { d } else { 1.0 };
            }

            if let Ok(delta) = solve(&a, &neg_jtr) {
                let p_new: Vec<f64> = p.iter().zip(&delta).map(|(pi, di)| pi + di).collect();
                let r_new = problem.residuals(&p_new);
                evaluations += 1;
                let chi2_new = sum_sq(&r_new);

                if chi2_new.is_finite() && chi2_new < chi2 {
                    let improvement = chi2 - chi2_new;
                    let step = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
                    let size = p.iter().map(|v| v * v).sum::<f64>().sqrt();
                    trace!(iterations, chi2 = chi2_new, lambda, "LM step accepted");

                    p = p_new;
                    r = r_new;
                    let chi2_old = chi2;
                    chi2 = chi2_new;
                    lambda = (lambda / 10.0).max(1e-12);

                    if improvement <= opts.ftol * chi2_old
                        || step <= opts.xtol * (size + opts.xtol)
                        || chi2 == 0.0
                    {
                        break 'outer;
                    }
                    continue 'outer;
                }
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No downhill step left: at the minimum to machine precision.
                break 'outer;
            }
            if evaluations >= max_evaluations {
                return Err(FitError::NotConverged { evaluations });
            }
        }
    }

    let jac = problem.jacobian(&p, &r);
    evaluations += m;
    let jtj = jac.t().dot(&jac);
    let red_chi2 = if n > m {
        chi2 / (n - m) as f64
    } else {
        f64::NAN
    };
    let var_cov = if n > m {
        invert(&jtj)? * red_chi2
    } else {
        Array2::from_elem((m, m), f64::INFINITY)
    };
    let dcoefs: Vec<f64> = var_cov.diag().iter().map(|v| v.sqrt()).collect();

    debug!(
        iterations,
        evaluations, chi2, red_chi2, "Levenberg-Marquardt fit converged"
    );

    let model = FitModel::Function { f: &f, coefs: &p };
    let quality = FitQuality::compute(model, Some(x), y, sigmas)?.with_uncertainties(dcoefs.clone());

    Ok(CurveFit {
        coefs: p,
        dcoefs,
        chi2,
        red_chi2,
        var_cov,
        evaluations,
        iterations,
        quality,
    })
}

struct Problem<'a, F> {
    f: &'a F,
    x: &'a [f64],
    y: &'a [f64],
    weights: &'a [f64],
}

impl<F> Problem<'_, F>
where
    F: Fn(f64, &[f64]) -> f64 + Sync,
{
    fn residuals(&self, p: &[f64]) -> Array1<f64> {
        self.x
            .iter()
            .zip(self.y)
            .zip(self.weights)
            .map(|((&xi, &yi), &wi)| ((self.f)(xi, p) - yi) * wi)
            .collect()
    }

    /// Forward-difference Jacobian of the weighted residuals, one column per coefficient.
    fn jacobian(&self, p: &[f64], r0: &Array1<f64>) -> Array2<f64> {
        let columns: Vec<Array1<f64>> = (0..p.len())
            .into_par_iter()
            .map(|j| {
                let mut h = SQRT_EPS * p[j].abs();
                if h == 0.0 {
                    h = SQRT_EPS;
                }
                let mut pj = p.to_vec();
                pj[j] += h;
                let h = pj[j] - p[j];
                (self.residuals(&pj) - r0) / h
            })
            .collect();

        let mut jac = Array2::zeros((r0.len(), p.len()));
        for (j, col) in columns.into_iter().enumerate() {
            jac.column_mut(j).assign(&col);
        }
        jac
    }
}

fn sum_sq(r: &Array1<f64>) -> f64 {
    r.iter().map(|v| v * v).sum()
}
