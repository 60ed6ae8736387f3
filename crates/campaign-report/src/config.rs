//! Configuration types for the campaign report pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The defaults reproduce the
//! classic layout: `data/campaign_data.csv` in, charts under `results/`,
//! cleaned table at `data/cleaned_campaign_data.csv`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default input CSV path.
pub const DEFAULT_INPUT_PATH: &str = "data/campaign_data.csv";
/// Default directory for chart images and the JSON report.
pub const DEFAULT_RESULTS_DIR: &str = "results";
/// Default path of the cleaned, feature-augmented CSV.
pub const DEFAULT_CLEANED_OUTPUT: &str = "data/cleaned_campaign_data.csv";

/// What to do with rows whose Impressions or Clicks are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZeroDenominatorPolicy {
    /// Fail the run, naming the column and the number of affected rows
    #[default]
    Error,
    /// Drop the affected rows before deriving ratio metrics
    Drop,
}

/// Configuration for the campaign report pipeline.
///
/// Use [`ReportConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use campaign_report::config::{ReportConfig, ZeroDenominatorPolicy};
///
/// let config = ReportConfig::builder()
///     .input_path("data/q3.csv")
///     .zero_denominator(ZeroDenominatorPolicy::Drop)
///     .seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Path to the campaign CSV.
    /// Default: "data/campaign_data.csv"
    pub input_path: PathBuf,

    /// Directory receiving chart images and the JSON report.
    /// Created if absent.
    /// Default: "results"
    pub results_dir: PathBuf,

    /// Path of the cleaned CSV export. Its parent directory is created if absent.
    /// Default: "data/cleaned_campaign_data.csv"
    pub cleaned_output: PathBuf,

    /// Fraction of rows held out for evaluating the regression (0.0 - 1.0, exclusive).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the train/test shuffle.
    /// Default: 42
    pub seed: u64,

    /// Revenue credited per conversion when computing ROI.
    /// Default: 100.0
    pub revenue_per_conversion: f64,

    /// Handling of zero Impressions / Clicks.
    /// Default: Error
    pub zero_denominator: ZeroDenominatorPolicy,

    /// Number of bins for the metric distribution histograms.
    /// Default: 20
    pub histogram_bins: usize,

    /// Number of rows shown in the console preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Whether to render the PNG charts.
    /// Default: true
    pub render_charts: bool,

    /// Whether to print the table preview and MSE to stdout.
    /// Default: true
    pub print_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            cleaned_output: PathBuf::from(DEFAULT_CLEANED_OUTPUT),
            test_size: 0.2,
            seed: 42,
            revenue_per_conversion: 100.0,
            zero_denominator: ZeroDenominatorPolicy::default(),
            histogram_bins: 20,
            preview_rows: 5,
            render_charts: true,
            print_summary: true,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        if !self.revenue_per_conversion.is_finite() {
            return Err(ConfigValidationError::InvalidRevenue(
                self.revenue_per_conversion,
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        for (field, path) in [
            ("input_path", &self.input_path),
            ("results_dir", &self.results_dir),
            ("cleaned_output", &self.cleaned_output),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),

    #[error("Invalid revenue per conversion: {0} (must be finite)")]
    InvalidRevenue(f64),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Path '{0}' must not be empty")]
    EmptyPath(String),
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    input_path: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    cleaned_output: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
    revenue_per_conversion: Option<f64>,
    zero_denominator: Option<ZeroDenominatorPolicy>,
    histogram_bins: Option<usize>,
    preview_rows: Option<usize>,
    render_charts: Option<bool>,
    print_summary: Option<bool>,
}

impl ReportConfigBuilder {
    /// Set the campaign CSV to analyze.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the directory for chart images and the JSON report.
    pub fn results_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(path.into());
        self
    }

    /// Set the cleaned CSV output path.
    pub fn cleaned_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.cleaned_output = Some(path.into());
        self
    }

    /// Set the held-out fraction for the regression.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the shuffle seed for the train/test split.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the revenue credited per conversion in the ROI formula.
    pub fn revenue_per_conversion(mut self, revenue: f64) -> Self {
        self.revenue_per_conversion = Some(revenue);
        self
    }

    /// Set the zero-denominator policy.
    pub fn zero_denominator(mut self, policy: ZeroDenominatorPolicy) -> Self {
        self.zero_denominator = Some(policy);
        self
    }

    /// Set the number of histogram bins for the metric distributions.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the number of rows printed in the preview.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Enable or disable PNG chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Enable or disable console output of the preview and MSE.
    pub fn print_summary(mut self, print: bool) -> Self {
        self.print_summary = Some(print);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let defaults = ReportConfig::default();
        let config = ReportConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            results_dir: self.results_dir.unwrap_or(defaults.results_dir),
            cleaned_output: self.cleaned_output.unwrap_or(defaults.cleaned_output),
            test_size: self.test_size.unwrap_or(defaults.test_size),
            seed: self.seed.unwrap_or(defaults.seed),
            revenue_per_conversion: self
                .revenue_per_conversion
                .unwrap_or(defaults.revenue_per_conversion),
            zero_denominator: self.zero_denominator.unwrap_or_default(),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            print_summary: self.print_summary.unwrap_or(defaults.print_summary),
        };

        config.validate()?;
        Ok(config)
    }
}
