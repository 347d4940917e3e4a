//! Dense Linear Algebra
//! LU solves, inversion and QR least squares on top of nalgebra, for ndarray inputs.

use super::FitError;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Relative size below which a pivot or R diagonal counts as zero.
const SINGULAR_TOL: f64 = 1e-13;

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |i, j| a[[i, j]])
}

fn to_dvector(b: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(b.len(), b.iter().copied())
}

/// True when the smallest diagonal element is negligible compared to the largest.
fn degenerate_diagonal(d: &DVector<f64>) -> bool {
    let max = d.amax();
    max == 0.0 || !max.is_finite() || d.iter().any(|v| v.abs() <= SINGULAR_TOL * max)
}

/// Solve `a x = b` for square `a` (LU with partial pivoting).
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, FitError> {
    let lu = to_dmatrix(a).lu();
    if degenerate_diagonal(&lu.u().diagonal()) {
        return Err(FitError::Singular);
    }
    let x = lu.solve(&to_dvector(b)).ok_or(FitError::Singular)?;
    Ok(Array1::from_iter(x.iter().copied()))
}

/// Invert a square matrix.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, FitError> {
    let m = to_dmatrix(a);
    if degenerate_diagonal(&m.clone().lu().u().diagonal()) {
        return Err(FitError::Singular);
    }
    let Some(inv) = m.try_inverse() else {
        return Err(FitError::Singular);
    };
    Ok(Array2::from_shape_fn(inv.shape(), |(i, j)| inv[(i, j)]))
}

/// Least-squares solution of the overdetermined system `a x ≈ b`.
///
/// Columns are scaled to unit norm before the QR decomposition, which keeps high-order
/// polynomial fits well conditioned.
pub fn lstsq(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, FitError> {
    let (m, n) = a.dim();
    if m < n {
        return Err(FitError::TooFewPoints {
            points: m,
            coefs: n,
        });
    }

    let mut a = to_dmatrix(a);
    let scales: Vec<f64> = a.column_iter().map(|c| c.norm()).collect();
    if scales.iter().any(|&s| s == 0.0 || !s.is_finite()) {
        return Err(FitError::RankDeficient);
    }
    for (mut col, &s) in a.column_iter_mut().zip(&scales) {
        col /= s;
    }

    let qr = a.qr();
    let r = qr.r();
    if degenerate_diagonal(&r.diagonal()) {
        return Err(FitError::RankDeficient);
    }
    let qtb = qr.q().transpose() * to_dvector(b);
    let x = r
        .solve_upper_triangular(&qtb)
        .ok_or(FitError::RankDeficient)?;

    Ok(x.iter().zip(&scales).map(|(v, s)| v / s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve() {
        let a = array![[0.0, 2.0, 1.0], [1.0, 1.0, 0.0], [3.0, 0.0, 1.0]];
        let x = array![1.0, -2.0, 3.0];
        let b = a.dot(&x);
        let sol = solve(&a, &b).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(sol[i], x[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invert() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let id = a.dot(&inv);
        assert_abs_diff_eq!(id[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(id[[0, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(id[[1, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(id[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(solve(&a, &array![1.0, 2.0]), Err(FitError::Singular)));
        assert!(matches!(invert(&a), Err(FitError::Singular)));
    }

    #[test]
    fn test_lstsq_line() {
        // y = 2x + 1 exactly, overdetermined
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut a = Array2::zeros((5, 2));
        let mut b = Array1::zeros(5);
        for (i, &x) in xs.iter().enumerate() {
            a[[i, 0]] = x;
            a[[i, 1]] = 1.0;
            b[i] = 2.0 * x + 1.0;
        }
        let c = lstsq(&a, &b).unwrap();
        assert_abs_diff_eq!(c[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lstsq_least_squares_residual() {
        // Mean of inconsistent observations
        let a = array![[1.0], [1.0], [1.0], [1.0]];
        let b = array![1.0, 2.0, 3.0, 6.0];
        let c = lstsq(&a, &b).unwrap();
        assert_abs_diff_eq!(c[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lstsq_rank_deficient() {
        let a = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let b = array![1.0, 2.0, 3.0];
        assert!(matches!(lstsq(&a, &b), Err(FitError::RankDeficient)));
        assert!(matches!(
            lstsq(&array![[1.0, 2.0]], &array![1.0]),
            Err(FitError::TooFewPoints { points: 1, coefs: 2 })
        ));
    }
}
