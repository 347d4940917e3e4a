//! Plot Geometry
//! Normalised histograms and arrow heads, computed independently of any drawing backend.

use super::ChartError;

/// Arrow-head length as a fraction of the plot width, for scale 1.
const ARROW_LENGTH: f64 = 0.1 / 3.0;
/// Width over length of an arrow head.
const ARROW_ASPECT: f64 = 2.0 / 3.0;

/// Histogram counts with the bin edges (one more edge than bins).
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<f64>,
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Sum of all bins.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn bin_centres(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }
}

/// Histogram normalised by the total number of values rather than to a probability density.
///
/// Every value has weight 1/n, so the bins sum to the fraction of the values inside `range`
/// (default: the data range). The last bin includes its upper edge.
pub fn hist_norm(
    values: &[f64],
    bins: usize,
    range: Option<(f64, f64)>,
) -> Result<Histogram, ChartError> {
    if values.is_empty() {
        return Err(ChartError::EmptyData);
    }
    if bins == 0 {
        return Err(ChartError::InvalidBins);
    }

    let (mut lo, mut hi) = match range {
        Some(r) => r,
        None => values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }),
    };
    if !(lo.is_finite() && hi.is_finite()) || hi < lo {
        return Err(ChartError::InvalidRange(lo, hi));
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let weight = 1.0 / values.len() as f64;
    let mut counts = vec![0.0; bins];
    for &v in values {
        if !(v >= lo && v <= hi) {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += weight;
    }

    Ok(Histogram { counts, edges })
}

/// An arrow head at the second of two points, pointing away from the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    /// Centre of the head (second point plus shift), in data coordinates.
    pub x: f64,
    pub y: f64,
    /// The two points the direction is taken from.
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub scale: f64,
}

/// Arrow head between two points, shifted by (`dx`, `dy`) and scaled by `scale`.
///
/// The head size does not depend on the distance between the points.
pub fn arrow_head_between_points(
    xx: [f64; 2],
    yy: [f64; 2],
    dx: f64,
    dy: f64,
    scale: f64,
) -> Result<ArrowHead, ChartError> {
    if (xx[1] - xx[0]).hypot(yy[1] - yy[0]) == 0.0 {
        return Err(ChartError::CoincidentPoints);
    }
    Ok(ArrowHead {
        x: xx[1] + dx,
        y: yy[1] + dy,
        from: (xx[0], yy[0]),
        to: (xx[1], yy[1]),
        scale,
    })
}

impl ArrowHead {
    /// Triangle (tip, base corners) in pixel coordinates.
    ///
    /// `centre` is the mapped head position, `direction` the mapped vector from the first to the
    /// second point; the head length is a fixed fraction of `plot_width`.
    pub fn polygon(
        &self,
        centre: (f64, f64),
        direction: (f64, f64),
        plot_width: f64,
    ) -> Option<[(f64, f64); 3]> {
        let norm = direction.0.hypot(direction.1);
        if norm == 0.0 {
            return None;
        }
        let (ux, uy) = (direction.0 / norm, direction.1 / norm);
        let length = plot_width * ARROW_LENGTH * self.scale;
        let half_width = length * ARROW_ASPECT / 2.0;

        let tip = (centre.0 + ux * length / 2.0, centre.1 + uy * length / 2.0);
        let base = (centre.0 - ux * length / 2.0, centre.1 - uy * length / 2.0);
        Some([
            tip,
            (base.0 - uy * half_width, base.1 + ux * half_width),
            (base.0 + uy * half_width, base.1 - ux * half_width),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hist_norm() {
        let values = [0.0, 1.0, 1.0, 2.0, 3.0, 4.0];
        let h = hist_norm(&values, 4, None).unwrap();
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(h.counts[0], 1.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(h.counts[1], 2.0 / 6.0, epsilon = 1e-12);
        // Last bin includes its upper edge
        assert_abs_diff_eq!(h.counts[3], 2.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(h.total(), 1.0, epsilon = 1e-12);
        assert_eq!(h.bin_centres()[0], 0.5);
    }

    #[test]
    fn test_hist_norm_range() {
        let values = [0.5, 1.5, 2.5, 10.0];
        let h = hist_norm(&values, 2, Some((0.0, 2.0))).unwrap();
        // Out-of-range values still count in the normalisation
        assert_abs_diff_eq!(h.total(), 0.5, epsilon = 1e-12);

        let same = hist_norm(&[3.0, 3.0], 1, None).unwrap();
        assert_eq!(same.edges, vec![2.5, 3.5]);
        assert_eq!(same.counts, vec![1.0]);
    }

    #[test]
    fn test_hist_norm_errors() {
        assert!(matches!(hist_norm(&[], 5, None), Err(ChartError::EmptyData)));
        assert!(matches!(hist_norm(&[1.0], 0, None), Err(ChartError::InvalidBins)));
        assert!(matches!(
            hist_norm(&[1.0], 3, Some((2.0, 1.0))),
            Err(ChartError::InvalidRange(..))
        ));
    }

    #[test]
    fn test_arrow_head() {
        let a = arrow_head_between_points([0.0, 1.0], [0.0, 0.0], 0.5, 0.0, 1.5).unwrap();
        assert_eq!((a.x, a.y), (1.5, 0.0));

        // Plot width 300 px, scale 1.5: length 15 px, half width 5 px
        let tri = a.polygon((100.0, 100.0), (10.0, 0.0), 300.0).unwrap();
        assert_abs_diff_eq!(tri[0].0, 107.5, epsilon = 1e-12);
        assert_abs_diff_eq!(tri[0].1, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tri[1].0, 92.5, epsilon = 1e-12);
        assert_abs_diff_eq!(tri[1].1, 105.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tri[2].1, 95.0, epsilon = 1e-12);
        assert!(a.polygon((0.0, 0.0), (0.0, 0.0), 300.0).is_none());
    }

    #[test]
    fn test_coincident_points() {
        assert!(matches!(
            arrow_head_between_points([1.0, 1.0], [2.0, 2.0], 0.0, 0.0, 1.0),
            Err(ChartError::CoincidentPoints)
        ));
    }
}
