//! Custom error types for the campaign report pipeline.
//!
//! This module provides the error hierarchy using `thiserror` so every
//! failure of a run (missing input, bad columns, degenerate data, chart
//! rendering) carries a stable code and a readable message.
//!
//! Errors serialize as `{code, message}`; a failed `--json` run of the CLI
//! prints them under an `error` key.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the campaign report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input CSV does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A required column is missing from the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A required column exists but cannot be used as a number.
    #[error("Column '{column}' must be numeric, found {dtype}")]
    InvalidColumnType { column: String, dtype: String },

    /// A ratio metric would divide by zero.
    #[error("Column '{column}' is zero in {rows} row(s); ratio metrics would be undefined")]
    ZeroDenominator { column: String, rows: usize },

    /// A value of the Date column could not be parsed.
    #[error("Failed to parse date value '{value}'")]
    DateParseFailed { value: String },

    /// Not enough rows to split into train and test sets.
    #[error("Not enough rows for modeling: {rows} available, {required} required")]
    InsufficientData { rows: usize, required: usize },

    /// A model input column holds NaN or an infinite value.
    #[error("Column '{column}' holds a non-finite value ({value}) in row {row}")]
    NonFiniteValue { column: String, row: usize, value: f64 },

    /// The regression design matrix has no unique least-squares solution.
    #[error("Regression design matrix is singular: {0}")]
    SingularDesign(String),

    /// A chart could not be drawn or saved.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderFailed { chart: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a chart failure from any displayable cause.
    pub fn chart(chart: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ReportError::ChartRenderFailed {
            chart: chart.into(),
            reason: reason.to_string(),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            Self::ZeroDenominator { .. } => "ZERO_DENOMINATOR",
            Self::DateParseFailed { .. } => "DATE_PARSE_FAILED",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::NonFiniteValue { .. } => "NON_FINITE_VALUE",
            Self::SingularDesign(_) => "SINGULAR_DESIGN",
            Self::ChartRenderFailed { .. } => "CHART_RENDER_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the failure comes from the shape of the input data rather
    /// than from the environment (files, rendering).
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::InvalidColumnType { .. }
            | Self::ZeroDenominator { .. }
            | Self::DateParseFailed { .. }
            | Self::InsufficientData { .. }
            | Self::NonFiniteValue { .. }
            | Self::SingularDesign(_) => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<crate::config::ConfigValidationError> for ReportError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        ReportError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ReportError::ColumnNotFound("CLV".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            ReportError::ZeroDenominator {
                column: "Clicks".to_string(),
                rows: 2
            }
            .error_code(),
            "ZERO_DENOMINATOR"
        );
    }

    #[test]
    fn test_is_data_error() {
        assert!(ReportError::SingularDesign("rank 2".to_string()).is_data_error());
        assert!(!ReportError::InputNotFound(PathBuf::from("x.csv")).is_data_error());
        assert!(
            ReportError::ColumnNotFound("Spend".to_string())
                .with_context("Deriving metrics")
                .is_data_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = ReportError::ColumnNotFound("Impressions".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Impressions"));
    }

    #[test]
    fn test_with_context() {
        let error = ReportError::DateParseFailed {
            value: "yesterday".to_string(),
        }
        .with_context("Parsing Date column");
        assert!(error.to_string().contains("Parsing Date column"));
        assert_eq!(error.error_code(), "DATE_PARSE_FAILED");
    }

    #[test]
    fn test_non_finite_value() {
        let error = ReportError::NonFiniteValue {
            column: "ROI".to_string(),
            row: 4,
            value: f64::NAN,
        };
        assert_eq!(error.error_code(), "NON_FINITE_VALUE");
        assert!(error.is_data_error());
        assert_eq!(
            error.to_string(),
            "Column 'ROI' holds a non-finite value (NaN) in row 4"
        );
    }

    #[test]
    fn test_zero_denominator_message() {
        let error = ReportError::ZeroDenominator {
            column: "Impressions".to_string(),
            rows: 3,
        };
        assert_eq!(
            error.to_string(),
            "Column 'Impressions' is zero in 3 row(s); ratio metrics would be undefined"
        );
    }
}
