//! Ordinary least squares with an intercept.
//!
//! Features and target are centered, each feature is scaled to unit norm and
//! the normal equations are solved by Gaussian elimination with partial
//! pivoting. The singularity test is applied to the scaled system, so rates
//! around 0.01 and ROI in the hundreds are judged alike.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// Relative pivot threshold below which the scaled system counts as singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// A fitted linear model `y = intercept + Σ coefficients[j] * x[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fit on row-major features `x` (one `Vec` per sample) and target `y`.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let n = x.len();
        let p = x.first().map_or(0, Vec::len);

        if n != y.len() {
            return Err(ReportError::InvalidConfig(format!(
                "feature rows ({n}) and target length ({}) differ",
                y.len()
            )));
        }
        if p == 0 || n < p + 1 {
            return Err(ReportError::SingularDesign(format!(
                "{n} training row(s) for {p} feature(s)"
            )));
        }
        if x.iter().any(|row| row.len() != p) {
            return Err(ReportError::InvalidConfig(
                "feature rows have inconsistent lengths".to_string(),
            ));
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        // Centered cross products X'X and X'y.
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, target) in x.iter().zip(y) {
            let dy = target - y_mean;
            for j in 0..p {
                let dj = row[j] - x_mean[j];
                xty[j] += dj * dy;
                for k in j..p {
                    xtx[j][k] += dj * (row[k] - x_mean[k]);
                }
            }
        }
        for j in 0..p {
            for k in 0..j {
                xtx[j][k] = xtx[k][j];
            }
        }

        let scale: Vec<f64> = (0..p).map(|j| xtx[j][j].sqrt()).collect();
        if let Some(j) = scale.iter().position(|s| !(*s > 0.0) || !s.is_finite()) {
            return Err(ReportError::SingularDesign(format!(
                "feature {j} is constant in the training set"
            )));
        }

        let a: Vec<Vec<f64>> = (0..p)
            .map(|j| (0..p).map(|k| xtx[j][k] / (scale[j] * scale[k])).collect())
            .collect();
        let b: Vec<f64> = (0..p).map(|j| xty[j] / scale[j]).collect();

        let z = solve_linear_system(a, b).ok_or_else(|| {
            ReportError::SingularDesign("features are linearly dependent".to_string())
        })?;

        let coefficients: Vec<f64> = z.iter().zip(&scale).map(|(zj, sj)| zj / sj).collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Predict one value per feature row.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Solve `a · z = b` in place; `None` if a pivot falls under the tolerance.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !(a[pivot_row][col].abs() > PIVOT_TOLERANCE) {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut z = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * z[k]).sum();
        z[row] = (b[row] - tail) / a[row][row];
    }
    Some(z)
}
