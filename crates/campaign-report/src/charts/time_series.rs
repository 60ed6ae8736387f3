//! Total ROI per date.

use super::{DrawResult, SERIES_COLOR};
use crate::error::Result;
use crate::features::{DATE, ROI};
use crate::utils::{MILLIS_PER_DAY, finite_range, numeric_values, temporal_millis};
use chrono::DateTime;
use plotters::prelude::*;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Sum ROI per distinct Date, ordered by date.
///
/// Dates are returned as milliseconds since the Unix epoch. Rows with a null
/// date are skipped.
pub fn roi_by_date(df: &DataFrame) -> Result<Vec<(i64, f64)>> {
    let dates = temporal_millis(df, DATE)?;
    let roi = numeric_values(df, ROI)?;

    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for (date, value) in dates.into_iter().zip(roi) {
        if let Some(ms) = date {
            *totals.entry(ms).or_insert(0.0) += value;
        }
    }
    Ok(totals.into_iter().collect())
}

/// Render an epoch-millisecond axis value as a calendar date.
pub fn format_millis(ms: f64) -> String {
    DateTime::from_timestamp_millis(ms.round() as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub(super) fn draw_time_series(path: &Path, size: (u32, u32), series: &[(i64, f64)]) -> DrawResult {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => return Err("no dated rows to plot".into()),
    };
    let (mut x_lo, mut x_hi) = (first as f64, last as f64);
    if x_lo == x_hi {
        x_lo -= MILLIS_PER_DAY as f64;
        x_hi += MILLIS_PER_DAY as f64;
    }

    let totals: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let (y_min, y_max) = finite_range(&totals).ok_or("ROI totals are not finite")?;
    let pad = ((y_max - y_min) * 0.08).max(1.0);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total ROI Over Time", ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|x| format_millis(*x))
        .x_desc("Date")
        .y_desc("Total ROI")
        .draw()?;

    let points: Vec<(f64, f64)> = series.iter().map(|(ms, v)| (*ms as f64, *v)).collect();
    chart.draw_series(LineSeries::new(points.clone(), SERIES_COLOR.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, SERIES_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parse_date_column;

    #[test]
    fn test_roi_by_date_sums_and_sorts() {
        let mut df = df!(
            DATE => &["2024-01-03", "2024-01-01", "2024-01-03", "2024-01-02"],
            ROI => &[10.0f64, -5.0, 2.5, 7.0]
        )
        .unwrap();
        assert!(parse_date_column(&mut df).unwrap());

        let series = roi_by_date(&df).unwrap();
        let days: Vec<String> = series.iter().map(|(ms, _)| format_millis(*ms as f64)).collect();
        let totals: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

        assert_eq!(days, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(totals, vec![-5.0, 7.0, 12.5]);
    }

    #[test]
    fn test_roi_by_date_requires_date_column() {
        let df = df!(ROI => &[1.0f64]).unwrap();
        assert!(roi_by_date(&df).is_err());
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.0), "1970-01-01");
        assert_eq!(format_millis(MILLIS_PER_DAY as f64 * 31.0), "1970-02-01");
    }
}
