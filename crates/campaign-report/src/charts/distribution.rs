//! Histogram panels with a KDE overlay.

use super::{DrawResult, SERIES_COLOR};
use crate::stats::{histogram, kde_count_curve};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Number of points sampled along each KDE curve.
const KDE_POINTS: usize = 200;

/// One histogram panel.
pub(super) struct HistogramPanel<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub values: &'a [f64],
    pub bins: usize,
}

pub(super) fn draw_histogram_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &HistogramPanel<'_>,
) -> DrawResult {
    let hist = histogram(panel.values, panel.bins)
        .ok_or_else(|| format!("no finite values for '{}'", panel.title))?;
    let curve = kde_count_curve(panel.values, &hist, KDE_POINTS);

    let x_lo = hist.edges[0];
    let x_hi = hist.edges[hist.edges.len() - 1];
    let y_hi = curve
        .iter()
        .map(|(_, y)| *y)
        .fold(hist.max_count() as f64, f64::max)
        .max(1.0)
        * 1.08;

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(panel.x_desc)
        .y_desc(panel.y_desc)
        .draw()?;

    chart.draw_series(hist.bins().map(|(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], SERIES_COLOR.mix(0.55).filled())
    }))?;
    chart.draw_series(hist.bins().map(|(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], SERIES_COLOR.stroke_width(1))
    }))?;

    if !curve.is_empty() {
        chart.draw_series(LineSeries::new(curve, SERIES_COLOR.stroke_width(2)))?;
    }

    Ok(())
}

/// Draw the panels side by side into one PNG.
pub(super) fn draw_histograms(
    path: &Path,
    size: (u32, u32),
    panels: &[HistogramPanel<'_>],
) -> DrawResult {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((1, panels.len().max(1)));
    for (area, panel) in areas.iter().zip(panels) {
        draw_histogram_panel(area, panel)?;
    }

    root.present()?;
    Ok(())
}
