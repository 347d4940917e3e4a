//! Cubic spline interpolation with not-a-knot end conditions.

use super::linalg::solve;
use super::{check_len, FitError};
use ndarray::{Array1, Array2};

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Build a spline through the points; `x` must be strictly increasing.
    ///
    /// Two points give a line and three a parabola. Beyond the knots the end polynomials are
    /// extrapolated.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, FitError> {
        let n = x.len();
        check_len("yvals", n, y.len())?;
        if n < 2 {
            return Err(FitError::TooFewPoints { points: n, coefs: 2 });
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FitError::NotIncreasing);
        }

        let m = match n {
            2 => vec![0.0; 2],
            3 => {
                let d01 = (y[1] - y[0]) / (x[1] - x[0]);
                let d12 = (y[2] - y[1]) / (x[2] - x[1]);
                vec![2.0 * (d12 - d01) / (x[2] - x[0]); 3]
            }
            _ => second_derivatives(x, y)?,
        };

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    pub fn eval(&self, t: f64) -> f64 {
        let n = self.x.len();
        let i = self
            .x
            .partition_point(|&xk| xk <= t)
            .saturating_sub(1)
            .min(n - 2);

        let h = self.x[i + 1] - self.x[i];
        let a = self.x[i + 1] - t;
        let b = t - self.x[i];
        let (mi, mj) = (self.m[i], self.m[i + 1]);

        mi * a.powi(3) / (6.0 * h)
            + mj * b.powi(3) / (6.0 * h)
            + (self.y[i] / h - mi * h / 6.0) * a
            + (self.y[i + 1] / h - mj * h / 6.0) * b
    }

    pub fn eval_many(&self, t: &[f64]) -> Vec<f64> {
        t.iter().map(|&v| self.eval(v)).collect()
    }
}

/// Solve the knot system; the third derivative is continuous at the second and the
/// second-to-last knot.
fn second_derivatives(x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let mut a = Array2::zeros((n, n));
    let mut b = Array1::zeros(n);

    a[[0, 0]] = h[1];
    a[[0, 1]] = -(h[0] + h[1]);
    a[[0, 2]] = h[0];

    for i in 1..n - 1 {
        a[[i, i - 1]] = h[i - 1];
        a[[i, i]] = 2.0 * (h[i - 1] + h[i]);
        a[[i, i + 1]] = h[i];
        b[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    a[[n - 1, n - 3]] = h[n - 2];
    a[[n - 1, n - 2]] = -(h[n - 3] + h[n - 2]);
    a[[n - 1, n - 1]] = h[n - 3];

    Ok(solve(&a, &b)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reproduces_cubic() {
        let f = |x: f64| 0.5 * x.powi(3) - 2.0 * x * x + x - 3.0;
        let x = [0.0, 0.7, 1.5, 3.0, 3.2, 5.0];
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        let s = CubicSpline::new(&x, &y).unwrap();

        for t in [-1.0, 0.0, 0.3, 1.0, 2.2, 3.1, 4.5, 5.0, 6.0] {
            assert_abs_diff_eq!(s.eval(t), f(t), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_passes_through_knots() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 2.0, 0.5, 0.0, 1.0];
        let s = CubicSpline::new(&x, &y).unwrap();
        let vals = s.eval_many(&x);
        for (v, yk) in vals.iter().zip(&y) {
            assert_abs_diff_eq!(v, yk, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_few_points() {
        let line = CubicSpline::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_abs_diff_eq!(line.eval(1.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(line.eval(3.0), 7.0, epsilon = 1e-12);

        let parabola = CubicSpline::new(&[0.0, 1.0, 3.0], &[0.0, 1.0, 9.0]).unwrap();
        assert_abs_diff_eq!(parabola.eval(2.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spline_errors() {
        assert!(matches!(
            CubicSpline::new(&[0.0, 1.0, 1.0, 2.0], &[0.0; 4]),
            Err(FitError::NotIncreasing)
        ));
        assert!(matches!(
            CubicSpline::new(&[0.0], &[0.0]),
            Err(FitError::TooFewPoints { .. })
        ));
        assert!(matches!(
            CubicSpline::new(&[0.0, 1.0], &[0.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }
}
