//! Shared utilities for the campaign report pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{ReportError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a calendar type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// CSV Utilities
// =============================================================================

/// Tokens read as missing values when loading a CSV.
pub const NULL_MARKERS: [&str; 9] = [
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

// =============================================================================
// Column Extraction
// =============================================================================

/// Extract a numeric column as `f64` values.
///
/// Integer columns are widened; nulls become `NaN`. Fails with
/// [`ReportError::ColumnNotFound`] or [`ReportError::InvalidColumnType`].
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let col = df
        .column(column)
        .map_err(|_| ReportError::ColumnNotFound(column.to_string()))?;

    if !is_numeric_dtype(col.dtype()) {
        return Err(ReportError::InvalidColumnType {
            column: column.to_string(),
            dtype: col.dtype().to_string(),
        });
    }

    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    Ok(values)
}

/// Extract a calendar column as milliseconds since the Unix epoch.
pub fn temporal_millis(df: &DataFrame, column: &str) -> Result<Vec<Option<i64>>> {
    let col = df
        .column(column)
        .map_err(|_| ReportError::ColumnNotFound(column.to_string()))?;
    let series = col.as_materialized_series();

    let millis = match series.dtype() {
        DataType::Date => series
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|d| d.map(|days| days as i64 * MILLIS_PER_DAY))
            .collect(),
        DataType::Datetime(_, _) => series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .collect(),
        other => {
            return Err(ReportError::InvalidColumnType {
                column: column.to_string(),
                dtype: other.to_string(),
            });
        }
    };

    Ok(millis)
}

/// Milliseconds in one calendar day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Finite minimum and maximum of a slice, skipping `NaN`/infinite values.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Truncate a string to max length with ellipsis
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
