use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Chart Artifacts
// ============================================================================

/// The charts a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Histograms of CTR, Conversion_Rate and ROI side by side.
    MetricsDistribution,
    /// Pearson correlation matrix of the numeric metrics.
    CorrelationHeatmap,
    /// Total ROI per date. Only drawn when the dataset has a Date column.
    RoiTimeSeries,
    /// Test-set CLV against the model's predictions.
    ActualVsPredicted,
    /// Histogram of test-set residuals.
    ResidualDistribution,
}

impl ChartKind {
    /// File name of the PNG inside the results directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::MetricsDistribution => "metrics_distribution.png",
            Self::CorrelationHeatmap => "correlation_heatmap.png",
            Self::RoiTimeSeries => "time_series_ROI.png",
            Self::ActualVsPredicted => "actual_vs_predicted_CLV.png",
            Self::ResidualDistribution => "residual_distribution.png",
        }
    }

    /// Get a human-readable display name for the chart.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MetricsDistribution => "Metrics Distribution",
            Self::CorrelationHeatmap => "Correlation Heatmap",
            Self::RoiTimeSeries => "Total ROI Over Time",
            Self::ActualVsPredicted => "Actual vs. Predicted CLV",
            Self::ResidualDistribution => "Distribution of Residuals",
        }
    }
}

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

impl ChartArtifact {
    pub fn new(kind: ChartKind, results_dir: &Path) -> Self {
        Self {
            kind,
            path: results_dir.join(kind.file_name()),
        }
    }
}

// ============================================================================
// Analysis Report
// ============================================================================

/// Fitted CLV model and its held-out score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub target: String,
    pub intercept: f64,
    /// (feature name, coefficient) in model order.
    pub coefficients: Vec<(String, f64)>,
    /// Mean squared error on the test set.
    pub mse: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
}

/// Summary of one analysis run.
///
/// Serialized to `analysis_report.json` when requested and printed by the
/// CLI with `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Local timestamp, `%Y-%m-%d %H:%M:%S`.
    pub generated_at: String,
    pub input_path: PathBuf,
    pub cleaned_output: PathBuf,

    /// Number of rows read from the input.
    pub rows_loaded: usize,
    /// Number of rows that reached the model and the cleaned CSV.
    pub rows_after_cleaning: usize,
    /// Rows removed for missing values or zero denominators.
    pub rows_dropped: usize,

    /// Columns of the cleaned table, derived metrics included.
    pub columns: Vec<String>,
    pub has_date: bool,

    /// Human-readable description of every cleaning step.
    pub cleaning_actions: Vec<String>,

    pub regression: RegressionSummary,

    /// Charts written during the run, in drawing order.
    pub charts: Vec<ChartArtifact>,

    pub warnings: Vec<String>,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

impl AnalysisReport {
    /// Percentage of loaded rows that were dropped.
    pub fn rows_dropped_percentage(&self) -> f64 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            (self.rows_dropped as f64 / self.rows_loaded as f64) * 100.0
        }
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&ChartArtifact> {
        self.charts.iter().find(|c| c.kind == kind)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            generated_at: "2024-01-01 12:00:00".to_string(),
            input_path: PathBuf::from("data/campaign_data.csv"),
            cleaned_output: PathBuf::from("data/cleaned_campaign_data.csv"),
            rows_loaded: 200,
            rows_after_cleaning: 190,
            rows_dropped: 10,
            columns: vec!["Impressions".to_string(), "CTR".to_string()],
            has_date: false,
            cleaning_actions: Vec::new(),
            regression: RegressionSummary {
                target: "CLV".to_string(),
                intercept: 1.0,
                coefficients: vec![("CTR".to_string(), 2.0)],
                mse: 3.5,
                train_rows: 152,
                test_rows: 38,
                seed: 42,
            },
            charts: vec![ChartArtifact::new(
                ChartKind::CorrelationHeatmap,
                Path::new("results"),
            )],
            warnings: Vec::new(),
            duration_ms: 12,
        }
    }

    #[test]
    fn test_chart_file_names() {
        assert_eq!(ChartKind::RoiTimeSeries.file_name(), "time_series_ROI.png");
        assert_eq!(
            ChartKind::ActualVsPredicted.file_name(),
            "actual_vs_predicted_CLV.png"
        );
        let artifact = ChartArtifact::new(ChartKind::MetricsDistribution, Path::new("out"));
        assert_eq!(artifact.path, Path::new("out").join("metrics_distribution.png"));
    }

    #[test]
    fn test_rows_dropped_percentage() {
        let report = sample_report();
        assert!((report.rows_dropped_percentage() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_serialization() {
        let report = sample_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows_loaded"], 200);
        assert_eq!(json["charts"][0]["kind"], "correlation_heatmap");
        assert_eq!(json["regression"]["coefficients"][0][0], "CTR");
        assert!(report.chart(ChartKind::CorrelationHeatmap).is_some());
        assert!(report.chart(ChartKind::RoiTimeSeries).is_none());
    }
}
