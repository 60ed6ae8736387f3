//! Predictive modeling of CLV.
//!
//! Fits [`LinearRegression`] on CTR, Conversion_Rate and ROI over a seeded
//! train split and evaluates it on the held-out rows.

mod regression;
mod split;

pub use regression::LinearRegression;
pub use split::{TrainTestSplit, train_test_split};

use crate::error::{ReportError, Result};
use crate::features::{CLV, MODEL_FEATURES};
use crate::stats::mean_squared_error;
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::{debug, info};

/// Outcome of fitting and evaluating the CLV regression.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub model: LinearRegression,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Observed CLV of the test rows.
    pub actual: Vec<f64>,
    /// Predicted CLV of the test rows, aligned with `actual`.
    pub predicted: Vec<f64>,
    pub mse: f64,
}

impl ModelEvaluation {
    /// `actual - predicted` for each test row.
    pub fn residuals(&self) -> Vec<f64> {
        self.actual
            .iter()
            .zip(&self.predicted)
            .map(|(a, p)| a - p)
            .collect()
    }
}

/// Split, fit and score the CLV model on the derived table.
pub fn evaluate_clv_model(df: &DataFrame, test_size: f64, seed: u64) -> Result<ModelEvaluation> {
    let columns: Vec<Vec<f64>> = MODEL_FEATURES
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<_>>()?;
    let target = numeric_values(df, CLV)?;

    let n = df.height();
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect();

    for (name, values) in MODEL_FEATURES.iter().zip(&columns).chain([(&CLV, &target)]) {
        if let Some((row, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ReportError::NonFiniteValue {
                column: name.to_string(),
                row,
                value: *value,
            });
        }
    }

    let split = train_test_split(n, test_size, seed)?;
    debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n,
        split.train.len(),
        split.test.len(),
        seed
    );

    let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>();
    let pick_target = |idx: &[usize]| idx.iter().map(|&i| target[i]).collect::<Vec<_>>();

    let model = LinearRegression::fit(&pick_rows(&split.train), &pick_target(&split.train))?;

    let actual = pick_target(&split.test);
    let predicted = model.predict(&pick_rows(&split.test));
    let mse = mean_squared_error(&actual, &predicted);

    info!(
        "Fitted CLV model: intercept {:.4}, coefficients {:?}, MSE {:.2}",
        model.intercept(),
        model.coefficients(),
        mse
    );

    Ok(ModelEvaluation {
        model,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        actual,
        predicted,
        mse,
    })
}
