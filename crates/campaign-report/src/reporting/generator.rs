use crate::error::{Result, ResultExt};
use crate::features::{CLV, MODEL_FEATURES};
use crate::model::ModelEvaluation;
use crate::types::{AnalysisReport, ChartArtifact, RegressionSummary};
use crate::utils::truncate_str;
use chrono::Local;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON run report inside the results directory.
pub const REPORT_FILE_NAME: &str = "analysis_report.json";

/// Everything a finished run knows about itself.
pub struct ReportParams<'a> {
    pub input_path: &'a Path,
    pub cleaned_output: &'a Path,
    pub rows_loaded: usize,
    /// The table as exported.
    pub final_df: &'a DataFrame,
    pub has_date: bool,
    pub cleaning_actions: Vec<String>,
    pub evaluation: &'a ModelEvaluation,
    pub seed: u64,
    pub charts: Vec<ChartArtifact>,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

/// Builds and persists [`AnalysisReport`]s.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from(crate::config::DEFAULT_RESULTS_DIR))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Assemble the report of a finished run.
    pub fn build_report(params: ReportParams<'_>) -> AnalysisReport {
        let model = &params.evaluation.model;
        let coefficients = MODEL_FEATURES
            .iter()
            .zip(model.coefficients())
            .map(|(name, value)| (name.to_string(), *value))
            .collect();

        let regression = RegressionSummary {
            target: CLV.to_string(),
            intercept: model.intercept(),
            coefficients,
            mse: params.evaluation.mse,
            train_rows: params.evaluation.train_rows,
            test_rows: params.evaluation.test_rows,
            seed: params.seed,
        };

        let rows_after_cleaning = params.final_df.height();

        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_path: params.input_path.to_path_buf(),
            cleaned_output: params.cleaned_output.to_path_buf(),
            rows_loaded: params.rows_loaded,
            rows_after_cleaning,
            rows_dropped: params.rows_loaded.saturating_sub(rows_after_cleaning),
            columns: params
                .final_df
                .get_column_names()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            has_date: params.has_date,
            cleaning_actions: params.cleaning_actions,
            regression,
            charts: params.charts,
            warnings: params.warnings,
            duration_ms: params.duration_ms,
        }
    }

    /// Write the report as pretty JSON to `<output_dir>/analysis_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("creating {}", self.output_dir.display()))?;

        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let mut file = File::create(&report_path)
            .context(format!("creating {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

/// Print a human-readable summary of a run.
///
/// This is the CLI's default output when neither `--json` nor `--quiet` is set.
pub fn print_human_readable_summary(report: &AnalysisReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CAMPAIGN ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:  {}", report.input_path.display());
    println!(
        "Output: {} ({} rows x {} columns)",
        report.cleaned_output.display(),
        report.rows_after_cleaning,
        report.columns.len()
    );
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Rows: {} -> {} ({} dropped, {:.1}%)",
        report.rows_loaded,
        report.rows_after_cleaning,
        report.rows_dropped,
        report.rows_dropped_percentage()
    );
    println!(
        "  Columns: {}",
        truncate_str(&report.columns.join(", "), 70)
    );
    println!(
        "  Date column: {}",
        if report.has_date { "parsed" } else { "absent" }
    );
    println!();

    let regression = &report.regression;
    println!("CLV Regression:");
    println!("  Intercept: {:.4}", regression.intercept);
    for (feature, coefficient) in &regression.coefficients {
        println!("  {feature}: {coefficient:.4}");
    }
    println!(
        "  Train/Test: {}/{} rows (seed {})",
        regression.train_rows, regression.test_rows, regression.seed
    );
    println!("  Mean Squared Error: {:.2}", regression.mse);
    println!();

    if !report.cleaning_actions.is_empty() {
        println!("Actions Taken:");
        for action in &report.cleaning_actions {
            println!("  - {action}");
        }
        println!();
    }

    if !report.charts.is_empty() {
        println!("Charts:");
        for chart in &report.charts {
            println!("  - {}: {}", chart.kind.display_name(), chart.path.display());
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {warning}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearRegression;
    use crate::types::ChartKind;
    use pretty_assertions::assert_eq;

    fn evaluation() -> ModelEvaluation {
        let x = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 2.0, 0.0],
            vec![3.0, 1.0, 5.0],
            vec![1.0, 3.0, 2.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 5.0 + r[0] - 2.0 * r[1] + 0.5 * r[2]).collect();
        ModelEvaluation {
            model: LinearRegression::fit(&x, &y).unwrap(),
            train_rows: 4,
            test_rows: 1,
            actual: vec![10.0],
            predicted: vec![9.0],
            mse: 1.0,
        }
    }

    fn final_df() -> DataFrame {
        df!("Impressions" => &[100i64, 200, 300], "CTR" => &[0.1f64, 0.2, 0.3]).unwrap()
    }

    #[test]
    fn test_build_report() {
        let df = final_df();
        let evaluation = evaluation();
        let report = ReportGenerator::build_report(ReportParams {
            input_path: Path::new("data/campaign_data.csv"),
            cleaned_output: Path::new("data/cleaned_campaign_data.csv"),
            rows_loaded: 4,
            final_df: &df,
            has_date: true,
            cleaning_actions: vec!["Removed 1 rows".to_string()],
            evaluation: &evaluation,
            seed: 42,
            charts: vec![ChartArtifact::new(ChartKind::RoiTimeSeries, Path::new("results"))],
            warnings: Vec::new(),
            duration_ms: 5,
        });

        assert_eq!(report.rows_after_cleaning, 3);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.columns, vec!["Impressions", "CTR"]);
        assert_eq!(report.regression.target, "CLV");
        assert_eq!(report.regression.coefficients.len(), 3);
        assert_eq!(report.regression.coefficients[0].0, "CTR");
        assert!((report.regression.intercept - 5.0).abs() < 1e-9);
        assert!((report.regression.coefficients[1].1 + 2.0).abs() < 1e-9);
        assert_eq!(report.regression.seed, 42);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("nested"));
        let df = final_df();
        let evaluation = evaluation();
        let report = ReportGenerator::build_report(ReportParams {
            input_path: Path::new("in.csv"),
            cleaned_output: Path::new("out.csv"),
            rows_loaded: 3,
            final_df: &df,
            has_date: false,
            cleaning_actions: Vec::new(),
            evaluation: &evaluation,
            seed: 7,
            charts: Vec::new(),
            warnings: vec!["something odd".to_string()],
            duration_ms: 1,
        });

        let path = generator.write_report_to_file(&report).unwrap();
        assert_eq!(path, dir.path().join("nested").join(REPORT_FILE_NAME));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["rows_loaded"], 3);
        assert_eq!(written["regression"]["seed"], 7);
        assert_eq!(written["warnings"][0], "something odd");
    }
}
