//! Fit Quality
//! Reduced chi², deviations and the printable fit report.
//!
//! Everything here is computed without fitting, so it works after any fit, or for comparing two
//! series of y values ("true" and "fit") that never came from a fit at all.

use super::polyfit::polyval;
use super::{check_len, check_sigmas, FitError};
use crate::numerics::cformat::float_repr;
use crate::numerics::{sprintf, Arg};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::fmt::Write;
use tracing::debug;

/// What produced the fitted y values.
#[derive(Clone, Copy)]
pub enum FitModel<'a> {
    /// Polynomial coefficients, highest power first.
    Polynomial(&'a [f64]),
    /// A fit function `f(x, coefs)` with its coefficients.
    Function {
        f: &'a (dyn Fn(f64, &[f64]) -> f64 + 'a),
        coefs: &'a [f64],
    },
    /// Precomputed fit values, one per data point.
    Values(&'a [f64]),
}

impl FitModel<'_> {
    fn coefs(&self) -> &[f64] {
        match self {
            FitModel::Polynomial(c) => c,
            FitModel::Function { coefs, .. } => coefs,
            FitModel::Values(_) => &[],
        }
    }
}

/// One data point with its fit value and residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct FitPoint {
    pub x: Option<f64>,
    pub y: f64,
    pub sigma: f64,
    pub yfit: f64,
    /// yfit - y
    pub diff: f64,
    /// (yfit - y) / sigma
    pub wdiff: f64,
    /// |yfit - y| / |y|
    pub rel: f64,
}

/// A maximum deviation and where it occurs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub value: f64,
    pub x: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReportDetail {
    /// Reduced chi², typical sigma and maximum deviations.
    Summary,
    /// Also the number of points, chi² and the coefficient table.
    #[default]
    Coefficients,
    /// Also the table of all data points.
    Table,
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub detail: ReportDetail,
    /// Coefficient names for the coefficient table.
    pub coef_names: Option<Vec<String>>,
    /// Multiplication factors for printing coefficients (e.g. rad → deg); default 1.
    pub coef_factors: Option<Vec<f64>>,
    /// Print the last coefficient first; defaults to true for polynomials.
    pub reverse: Option<bool>,
}

/// Statistics comparing data with a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitQuality {
    pub ndat: usize,
    pub ncoefs: usize,
    pub chi2: f64,
    /// chi² / (ndat - ncoefs); NaN when there are no degrees of freedom.
    pub red_chi2: f64,
    pub ysigma_mean: f64,
    /// Estimate of the true sigma of the data: √χ²_red · mean(σ).
    pub typical_sigma: f64,
    pub max_abs_dev: Deviation,
    /// None when all y values are zero.
    pub max_rel_dev: Option<Deviation>,
    /// Probability of a chi² at least this large for a correct model.
    pub chi2_probability: Option<f64>,
    pub coefs: Vec<f64>,
    pub dcoefs: Option<Vec<f64>>,
    pub points: Vec<FitPoint>,
    /// No sigmas were given and σ = 1 was assumed.
    pub sigmas_assumed: bool,
    polynomial: bool,
}

impl FitQuality {
    /// Compute the fit statistics.
    ///
    /// `x` is required for [`FitModel::Polynomial`] and [`FitModel::Function`].
    pub fn compute(
        model: FitModel<'_>,
        x: Option<&[f64]>,
        y: &[f64],
        sigmas: Option<&[f64]>,
    ) -> Result<Self, FitError> {
        let ndat = y.len();
        let coefs = model.coefs().to_vec();
        let ncoefs = coefs.len();
        if ndat == 0 {
            return Err(FitError::TooFewPoints {
                points: 0,
                coefs: ncoefs,
            });
        }
        if let Some(x) = x {
            check_len("xvals", ndat, x.len())?;
        }
        check_sigmas(sigmas, ndat)?;

        let yfit: Vec<f64> = match model {
            FitModel::Polynomial(c) => {
                let x = x.ok_or(FitError::MissingX)?;
                x.iter().map(|&xi| polyval(c, xi)).collect()
            }
            FitModel::Function { f, coefs } => {
                let x = x.ok_or(FitError::MissingX)?;
                x.iter().map(|&xi| f(xi, coefs)).collect()
            }
            FitModel::Values(v) => {
                check_len("yfit", ndat, v.len())?;
                v.to_vec()
            }
        };

        let sigmas_assumed = sigmas.is_none();
        if sigmas_assumed {
            debug!("ysigmas not given; assuming sigma=1 for all data points");
        }

        let points: Vec<FitPoint> = (0..ndat)
            .map(|i| {
                let sigma = sigmas.map_or(1.0, |s| s[i]);
                let diff = yfit[i] - y[i];
                FitPoint {
                    x: x.map(|x| x[i]),
                    y: y[i],
                    sigma,
                    yfit: yfit[i],
                    diff,
                    wdiff: diff / sigma,
                    rel: (diff / y[i]).abs(),
                }
            })
            .collect();

        let chi2: f64 = points.iter().map(|p| p.wdiff.powi(2)).sum();
        let red_chi2 = if ndat > ncoefs {
            chi2 / (ndat - ncoefs) as f64
        } else {
            f64::NAN
        };
        let ysigma_mean = points.iter().map(|p| p.sigma).sum::<f64>() / ndat as f64;

        let max_abs_dev = points
            .iter()
            .fold(None::<Deviation>, |best, p| match best {
                Some(b) if b.value >= p.diff.abs() => Some(b),
                _ => Some(Deviation {
                    value: p.diff.abs(),
                    x: p.x,
                }),
            })
            .unwrap_or(Deviation {
                value: f64::NAN,
                x: None,
            });
        let max_rel_dev = points
            .iter()
            .filter(|p| p.y != 0.0)
            .fold(None::<Deviation>, |best, p| match best {
                Some(b) if b.value >= p.rel => Some(b),
                _ => Some(Deviation {
                    value: p.rel,
                    x: p.x,
                }),
            });

        let chi2_probability = if ndat > ncoefs && chi2.is_finite() {
            ChiSquared::new((ndat - ncoefs) as f64)
                .ok()
                .map(|d| d.sf(chi2))
        } else {
            None
        };

        Ok(Self {
            ndat,
            ncoefs,
            chi2,
            red_chi2,
            ysigma_mean,
            typical_sigma: red_chi2.sqrt() * ysigma_mean,
            max_abs_dev,
            max_rel_dev,
            chi2_probability,
            coefs,
            dcoefs: None,
            points,
            sigmas_assumed,
            polynomial: matches!(model, FitModel::Polynomial(_)),
        })
    }

    /// Attach coefficient uncertainties (shown in the coefficient table).
    pub fn with_uncertainties(mut self, dcoefs: Vec<f64>) -> Self {
        self.dcoefs = Some(dcoefs);
        self
    }

    /// Render the fit report.
    pub fn report(&self, opts: &ReportOptions) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_report(&mut out, opts);
        out
    }

    fn write_report(&self, out: &mut String, opts: &ReportOptions) -> std::fmt::Result {
        if self.sigmas_assumed {
            writeln!(out, "ysigmas=None; assuming sigma=1 for all data points.")?;
            writeln!(out)?;
        }
        if opts.detail >= ReportDetail::Coefficients {
            writeln!(out, "Fit quality:")?;
            writeln!(out, "Number of data points:     {}", self.ndat)?;
            writeln!(out, "Chi2:                      {}", self.chi2)?;
        }
        writeln!(out, "Reduced chi2:              {}", self.red_chi2)?;
        writeln!(out, "Typical original sigma:    {}", self.typical_sigma)?;
        writeln!(
            out,
            "Max. absolute deviation:   {}  @ x = {}",
            self.max_abs_dev.value,
            fmt_x(self.max_abs_dev.x)
        )?;
        match self.max_rel_dev {
            Some(d) => writeln!(
                out,
                "Max. relative deviation:   {}  @ x = {}",
                d.value,
                fmt_x(d.x)
            )?,
            None => writeln!(out, "Max. relative deviation:   None")?,
        }

        if opts.detail >= ReportDetail::Coefficients && !self.coefs.is_empty() {
            self.write_coefficients(out, opts)?;
        }
        if opts.detail >= ReportDetail::Table {
            self.write_table(out)?;
        }
        Ok(())
    }

    fn write_coefficients(&self, out: &mut String, opts: &ReportOptions) -> std::fmt::Result {
        let reverse = opts.reverse.unwrap_or(self.polynomial);
        let n = self.coefs.len();
        let name_width = opts
            .coef_names
            .as_ref()
            .and_then(|names| names.iter().map(|s| s.chars().count()).max())
            .unwrap_or(0);

        write!(out, "\nFit coefficients")?;
        if reverse {
            write!(out, " (reversed)")?;
        }
        writeln!(out, ":")?;

        for i in 0..n {
            let j = if reverse { n - i - 1 } else { i };
            let fac = opts
                .coef_factors
                .as_ref()
                .and_then(|f| f.get(j).copied())
                .unwrap_or(1.0);

            write!(out, " c{}:", i)?;
            if let Some(name) = opts.coef_names.as_ref().and_then(|names| names.get(j)) {
                write!(out, " {:>width$}: ", name, width = name_width)?;
            }
            write!(out, "{}", cfmt(" %12.5e", &[(self.coefs[j] * fac).into()]))?;
            if let Some(dc) = self.dcoefs.as_ref().and_then(|d| d.get(j)) {
                let rel = (dc / self.coefs[j] * 100.0).abs();
                write!(
                    out,
                    "{}",
                    cfmt(" ± %12.5e (%9.2f%%)", &[(dc * fac).into(), rel.into()])
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_table(&self, out: &mut String) -> std::fmt::Result {
        let header = cfmt(
            "%9s  %12s  %12s  %12s  %12s  %12s  %12s  %12s",
            &[
                "i".into(),
                "x_val".into(),
                "y_val".into(),
                "y_sigma".into(),
                "y_fit".into(),
                "y_diff_abs".into(),
                "y_diff_wgt".into(),
                "y_diff_rel".into(),
            ],
        );
        writeln!(out, "\nFit data:")?;
        writeln!(out, "{header}")?;
        for (i, p) in self.points.iter().enumerate() {
            let row = cfmt(
                "%9i  %12.5e  %12.5e  %12.5e  %12.5e  %12.5e  %12.5e  %12.5e",
                &[
                    i.into(),
                    p.x.unwrap_or(f64::NAN).into(),
                    p.y.into(),
                    p.sigma.into(),
                    p.yfit.into(),
                    p.diff.into(),
                    p.wdiff.into(),
                    p.rel.into(),
                ],
            );
            writeln!(out, "{row}")?;
        }
        writeln!(out, "{header}")
    }
}

fn fmt_x(x: Option<f64>) -> String {
    x.map_or_else(|| "None".to_string(), float_repr)
}

/// Formats in this module are fixed and always get matching numeric arguments.
fn cfmt(fmt: &str, args: &[Arg]) -> String {
    sprintf(fmt, args).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_data() -> (Vec<f64>, Vec<f64>) {
        (vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 1.0, 3.0])
    }

    #[test]
    fn test_quality_of_polynomial() {
        let (x, y) = line_data();
        let coefs = [0.9, -0.1];
        let q = FitQuality::compute(FitModel::Polynomial(&coefs), Some(&x), &y, None).unwrap();

        assert_eq!(q.ndat, 4);
        assert_eq!(q.ncoefs, 2);
        assert_abs_diff_eq!(q.chi2, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(q.red_chi2, 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(q.typical_sigma, 0.35f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(q.max_abs_dev.value, 0.7, epsilon = 1e-12);
        assert_eq!(q.max_abs_dev.x, Some(2.0));
        let rel = q.max_rel_dev.unwrap();
        assert_abs_diff_eq!(rel.value, 0.7, epsilon = 1e-12);
        assert_eq!(rel.x, Some(2.0));
        assert!(q.sigmas_assumed);

        let p = q.chi2_probability.unwrap();
        assert!(p > 0.6 && p < 0.8, "p = {p}");
    }

    #[test]
    fn test_quality_with_sigmas_and_values() {
        let y = [1.0, 2.0, 3.0];
        let yfit = [1.5, 2.0, 2.0];
        let sig = [0.5, 1.0, 2.0];
        let q = FitQuality::compute(FitModel::Values(&yfit), None, &y, Some(&sig)).unwrap();
        assert_eq!(q.ncoefs, 0);
        assert_abs_diff_eq!(q.chi2, 1.0 + 0.0 + 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(q.red_chi2, 1.25 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.ysigma_mean, 3.5 / 3.0, epsilon = 1e-12);
        assert_eq!(q.max_abs_dev.x, None);
        assert!(!q.sigmas_assumed);
    }

    #[test]
    fn test_function_model() {
        let f = |x: f64, c: &[f64]| c[0] * x;
        let x = [1.0, 2.0];
        let q = FitQuality::compute(
            FitModel::Function { f: &f, coefs: &[2.0] },
            Some(&x),
            &[2.0, 4.0],
            None,
        )
        .unwrap();
        assert_eq!(q.chi2, 0.0);
        assert_eq!(q.points[1].yfit, 4.0);
    }

    #[test]
    fn test_quality_errors() {
        let y = [1.0, 2.0];
        assert!(matches!(
            FitQuality::compute(FitModel::Polynomial(&[1.0]), None, &y, None),
            Err(FitError::MissingX)
        ));
        assert!(matches!(
            FitQuality::compute(FitModel::Values(&[1.0]), None, &y, None),
            Err(FitError::LengthMismatch { .. })
        ));
        assert!(matches!(
            FitQuality::compute(FitModel::Values(&[1.0, 2.0]), None, &y, Some(&[1.0, 0.0])),
            Err(FitError::InvalidSigma)
        ));
        assert!(matches!(
            FitQuality::compute(FitModel::Values(&[]), None, &[], None),
            Err(FitError::TooFewPoints { .. })
        ));
    }

    #[test]
    fn test_report() {
        let (x, y) = line_data();
        let coefs = [0.9, -0.1];
        let q = FitQuality::compute(FitModel::Polynomial(&coefs), Some(&x), &y, None)
            .unwrap()
            .with_uncertainties(vec![0.1, 0.05]);

        let summary = q.report(&ReportOptions {
            detail: ReportDetail::Summary,
            ..Default::default()
        });
        assert!(summary.contains("Reduced chi2:"));
        assert!(!summary.contains("Fit coefficients"));

        let full = q.report(&ReportOptions {
            detail: ReportDetail::Table,
            coef_names: Some(vec!["slope".into(), "offset".into()]),
            ..Default::default()
        });
        assert!(full.contains("Fit coefficients (reversed):"));
        assert!(full.contains(" c0: offset:  -1.00000e-01 ±  5.00000e-02 (    50.00%)"));
        assert!(full.contains(" c1:  slope:   9.00000e-01 ±  1.00000e-01 (    11.11%)"));
        assert!(full.contains("Fit data:"));
        assert_eq!(full.matches("y_diff_rel").count(), 2);
    }
}
