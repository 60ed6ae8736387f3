//! Actual vs. predicted CLV.

use super::{DrawResult, SERIES_COLOR};
use crate::utils::finite_range;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

/// Dash length and gap of the identity line, in pixels.
const DASH_SIZE: u32 = 10;
const DASH_GAP: u32 = 6;

/// Shared axis range covering both actual and predicted values.
pub fn shared_range(actual: &[f64], predicted: &[f64]) -> Option<(f64, f64)> {
    let both: Vec<f64> = actual.iter().chain(predicted).copied().collect();
    finite_range(&both)
}

/// Endpoints of the y = x line, from the smallest to the largest actual value.
fn identity_segment(actual: &[f64], fallback: (f64, f64)) -> [(f64, f64); 2] {
    let (lo, hi) = finite_range(actual).unwrap_or(fallback);
    [(lo, lo), (hi, hi)]
}

pub(super) fn draw_actual_vs_predicted(
    path: &Path,
    size: (u32, u32),
    actual: &[f64],
    predicted: &[f64],
) -> DrawResult {
    let (lo, hi) = shared_range(actual, predicted).ok_or("no finite predictions to plot")?;
    let pad = ((hi - lo) * 0.05).max(1.0);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Actual vs. Predicted CLV", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d((lo - pad)..(hi + pad), (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .x_desc("Actual CLV")
        .y_desc("Predicted CLV")
        .draw()?;

    chart.draw_series(
        actual
            .iter()
            .zip(predicted)
            .map(|(&a, &p)| Circle::new((a, p), 4, SERIES_COLOR.mix(0.7).filled())),
    )?;

    chart.draw_series(DashedLineSeries::new(
        identity_segment(actual, (lo, hi)),
        DASH_SIZE,
        DASH_GAP,
        RED.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}
