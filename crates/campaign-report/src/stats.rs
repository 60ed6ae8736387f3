//! Descriptive statistics used by the charts and the model evaluation.

use crate::error::Result;
use crate::utils::{finite_range, numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }

    let mean = mean(values);
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Pearson correlation coefficient.
///
/// `NaN` when fewer than two points are available or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x);
    let my = mean(y);

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return f64::NAN;
    }
    (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
}

/// Square matrix of pairwise Pearson correlations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major values, `values[i][j]` = corr(labels[i], labels[j]).
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == col)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation matrix over the given numeric columns.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<_>>()?;

    let values = data
        .iter()
        .map(|x| data.iter().map(|y| pearson(x, y)).collect())
        .collect();

    Ok(CorrelationMatrix {
        labels: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// (lower edge, upper edge, count) per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, c)| (w[0], w[1], *c))
    }
}

/// Bin the finite values into `bins` equal-width bins over [min, max].
///
/// The last bin is closed on the right. A constant input is spread over
/// [v - 0.5, v + 0.5]. Returns `None` when no finite value exists.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let bins = bins.max(1);
    let (mut lo, mut hi) = finite_range(values)?;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];

    for v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Sturges' rule for the number of histogram bins.
pub fn sturges_bins(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    ((n as f64).log2().ceil() as usize) + 1
}

/// Scott's rule bandwidth for a one-dimensional Gaussian KDE.
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    std_dev(values) * (values.len() as f64).powf(-0.2)
}

/// Gaussian kernel density estimate evaluated at each grid point.
///
/// Returns an empty vector when the bandwidth is degenerate (fewer than two
/// points or zero variance).
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let h = scott_bandwidth(&finite);
    if finite.len() < 2 || !(h > 0.0) {
        return Vec::new();
    }

    let norm = 1.0 / (finite.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|x| {
            finite
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / h).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}

/// KDE curve over a histogram's range, scaled to bin counts.
pub fn kde_count_curve(values: &[f64], hist: &Histogram, points: usize) -> Vec<(f64, f64)> {
    let (Some(lo), Some(hi)) = (hist.edges.first(), hist.edges.last()) else {
        return Vec::new();
    };
    let points = points.max(2);
    let step = (hi - lo) / (points - 1) as f64;
    let grid: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();

    let n = values.iter().filter(|v| v.is_finite()).count() as f64;
    let scale = n * hist.bin_width();

    gaussian_kde(values, &grid)
        .into_iter()
        .zip(grid)
        .map(|(density, x)| (x, density * scale))
        .collect()
}

/// Mean of squared differences. `NaN` for empty input.
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==================== std_dev tests ====================

    #[test]
    fn test_std_dev_basic() {
        // Variance = 10 / 4 = 2.5
        assert_relative_eq!(std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5f64.sqrt());
    }

    #[test]
    fn test_std_dev_single_value() {
        assert_eq!(std_dev(&[5.0]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_diagonal_and_symmetry() {
        let df = df!(
            "a" => &[1.0f64, 2.0, 3.0, 5.0],
            "b" => &[2i64, 1, 4, 3],
            "c" => &[9.0f64, 7.0, 4.0, 1.0]
        )
        .unwrap();
        let m = correlation_matrix(&df, &["a", "b", "c"]).unwrap();

        assert_eq!(m.labels, vec!["a", "b", "c"]);
        for i in 0..3 {
            assert_relative_eq!(m.values[i][i], 1.0, epsilon = 1e-12);
            for j in 0..3 {
                assert_relative_eq!(m.values[i][j], m.values[j][i], epsilon = 1e-12);
            }
        }
        assert!(m.get("a", "c").unwrap() < -0.9);
        assert_eq!(m.get("a", "zzz"), None);
    }

    // ==================== histogram tests ====================

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, f64::NAN];
        let h = histogram(&values, 2).unwrap();
        assert_eq!(h.edges, vec![0.0, 0.5, 1.0]);
        // 1.0 falls in the last (right-closed) bin, NaN is skipped
        assert_eq!(h.counts, vec![2, 3]);
        assert_relative_eq!(h.bin_width(), 0.5);
        assert_eq!(h.max_count(), 3);
    }

    #[test]
    fn test_histogram_constant_values() {
        let h = histogram(&[3.0, 3.0, 3.0], 4).unwrap();
        assert_relative_eq!(h.edges[0], 2.5);
        assert_relative_eq!(*h.edges.last().unwrap(), 3.5);
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).is_none());
        assert!(histogram(&[f64::NAN], 20).is_none());
    }

    #[test]
    fn test_sturges_bins() {
        assert_eq!(sturges_bins(0), 1);
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(100), 8);
    }

    // ==================== KDE tests ====================

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 4.5, 6.0];
        let step = 0.01;
        let grid: Vec<f64> = (0..2000).map(|i| -5.0 + i as f64 * step).collect();
        let area: f64 = gaussian_kde(&values, &grid).iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn test_kde_degenerate_is_empty() {
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], &[2.0]).is_empty());
        assert!(gaussian_kde(&[2.0], &[2.0]).is_empty());
    }

    #[test]
    fn test_kde_count_curve_spans_histogram() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let h = histogram(&values, 4).unwrap();
        let curve = kde_count_curve(&values, &h, 50);
        assert_eq!(curve.len(), 50);
        assert_relative_eq!(curve[0].0, 1.0);
        assert_relative_eq!(curve[49].0, 5.0, epsilon = 1e-9);
        assert!(curve.iter().all(|(_, y)| *y > 0.0));
    }

    // ==================== MSE tests ====================

    #[test]
    fn test_mean_squared_error() {
        assert_relative_eq!(mean_squared_error(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]), 4.0 / 3.0);
        assert_eq!(mean_squared_error(&[2.0], &[2.0]), 0.0);
        assert!(mean_squared_error(&[], &[]).is_nan());
    }
}
