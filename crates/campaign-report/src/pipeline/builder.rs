//! Main campaign report pipeline.
//!
//! This module provides the `Pipeline` struct and builder that run the
//! analysis stages in order: load, clean, derive, chart, model, export.

use crate::charts::ChartRenderer;
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, ReportConfig};
use crate::error::{Result, ResultExt};
use crate::features::{
    CORRELATION_COLUMNS, derive_metrics, handle_zero_denominators, parse_date_column,
    validate_required_columns,
};
use crate::io::{load_campaign_csv, write_cleaned_csv};
use crate::model::evaluate_clv_model;
use crate::pipeline::progress::{
    ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportStage,
};
use crate::reporting::{ReportGenerator, ReportParams};
use crate::stats::correlation_matrix;
use crate::types::{AnalysisReport, ChartArtifact};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The campaign report pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use campaign_report::{Pipeline, ReportConfig};
///
/// let report = Pipeline::builder()
///     .config(ReportConfig::builder().input_path("data/q3.csv").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("MSE: {:.2}", report.regression.mse);
/// ```
pub struct Pipeline {
    config: ReportConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    charts: ChartRenderer,
    reporter: ReportGenerator,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load the configured input CSV and run every stage on it.
    pub fn run(&self) -> Result<AnalysisReport> {
        let start_time = Instant::now();
        let result = self
            .prepare_results_dir()
            .and_then(|()| self.load())
            .and_then(|df| self.analyze(df, start_time));
        self.finish(result)
    }

    /// Run every stage after loading on an already loaded table.
    pub fn process(&self, df: DataFrame) -> Result<AnalysisReport> {
        let start_time = Instant::now();
        let result = self
            .prepare_results_dir()
            .and_then(|()| self.analyze(df, start_time));
        self.finish(result)
    }

    /// Write the report to `<results_dir>/analysis_report.json`.
    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        self.reporter.write_report_to_file(report)
    }

    fn finish(&self, result: Result<AnalysisReport>) -> Result<AnalysisReport> {
        match result {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(report)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn prepare_results_dir(&self) -> Result<()> {
        let dir = &self.config.results_dir;
        fs::create_dir_all(dir).context(format!("Creating {}", dir.display()))?;
        debug!("Results directory ready: {}", dir.display());
        Ok(())
    }

    fn load(&self) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            ReportStage::Loading,
            0.0,
            format!("Loading {}...", self.config.input_path.display()),
        ));
        info!("Step 1: Loading {}...", self.config.input_path.display());

        let df = load_campaign_csv(&self.config.input_path)?;

        self.report_progress(ProgressUpdate::new(
            ReportStage::Loading,
            1.0,
            format!("Loaded {} rows x {} columns", df.height(), df.width()),
        ));
        Ok(df)
    }

    fn analyze(&self, df: DataFrame, start_time: Instant) -> Result<AnalysisReport> {
        let rows_loaded = df.height();
        let mut warnings: Vec<String> = Vec::new();

        // Step 2: Drop rows with missing values
        self.report_progress(ProgressUpdate::new(
            ReportStage::Cleaning,
            0.0,
            "Dropping rows with missing values...",
        ));
        info!("Step 2: Dropping rows with missing values...");

        let (df, cleaning_actions) = self.cleaner.drop_missing_rows(df)?;

        self.report_progress(ProgressUpdate::new(
            ReportStage::Cleaning,
            1.0,
            format!("{} rows remain after cleaning", df.height()),
        ));

        // Step 3: Derived metrics and dates
        self.report_progress(ProgressUpdate::new(
            ReportStage::FeatureDerivation,
            0.0,
            "Deriving CTR, Conversion_Rate and ROI...",
        ));
        info!("Step 3: Deriving features...");

        validate_required_columns(&df)?;
        let (mut df, zero_warnings) =
            handle_zero_denominators(df, self.config.zero_denominator)?;
        warnings.extend(zero_warnings);
        derive_metrics(&mut df, self.config.revenue_per_conversion)
            .context("Deriving metrics")?;
        let has_date = parse_date_column(&mut df)?;

        if self.config.print_summary && self.config.preview_rows > 0 {
            println!("{}", preview_text(&df, self.config.preview_rows));
        }

        self.report_progress(ProgressUpdate::new(
            ReportStage::FeatureDerivation,
            1.0,
            "Features derived",
        ));

        // Step 4: Exploratory charts
        self.report_progress(ProgressUpdate::new(
            ReportStage::Visualization,
            0.0,
            "Rendering charts...",
        ));
        info!("Step 4: Rendering exploratory charts...");

        let mut charts: Vec<ChartArtifact> = Vec::new();
        if self.config.render_charts {
            charts.push(self.charts.metrics_distribution(&df)?);

            let matrix = correlation_matrix(&df, &CORRELATION_COLUMNS)?;
            charts.push(self.charts.correlation_heatmap(&matrix)?);

            if has_date {
                charts.push(self.charts.roi_time_series(&df)?);
            } else {
                debug!("No Date column; skipping the ROI time series");
            }
        } else {
            debug!("Chart rendering disabled");
        }

        self.report_progress(ProgressUpdate::new(
            ReportStage::Visualization,
            1.0,
            format!("{} chart(s) rendered", charts.len()),
        ));

        // Step 5: CLV regression
        self.report_progress(ProgressUpdate::new(
            ReportStage::Modeling,
            0.0,
            "Fitting CLV regression...",
        ));
        info!("Step 5: Fitting CLV regression...");

        let evaluation = evaluate_clv_model(&df, self.config.test_size, self.config.seed)?;

        if self.config.print_summary {
            println!("Mean Squared Error: {:.2}", evaluation.mse);
        }

        if self.config.render_charts {
            charts.push(
                self.charts
                    .actual_vs_predicted(&evaluation.actual, &evaluation.predicted)?,
            );
            charts.push(self.charts.residual_distribution(&evaluation.residuals())?);
        }

        self.report_progress(ProgressUpdate::new(
            ReportStage::Modeling,
            1.0,
            format!("Test MSE {:.2}", evaluation.mse),
        ));

        // Step 6: Export
        self.report_progress(ProgressUpdate::new(
            ReportStage::Export,
            0.0,
            "Exporting cleaned data...",
        ));
        info!("Step 6: Exporting cleaned data...");

        write_cleaned_csv(&mut df, &self.config.cleaned_output)?;

        if self.config.print_summary {
            println!(
                "Cleaned data exported to {}",
                self.config.cleaned_output.display()
            );
        }

        let report = ReportGenerator::build_report(ReportParams {
            input_path: &self.config.input_path,
            cleaned_output: &self.config.cleaned_output,
            rows_loaded,
            final_df: &df,
            has_date,
            cleaning_actions,
            evaluation: &evaluation,
            seed: self.config.seed,
            charts,
            warnings,
            duration_ms: start_time.elapsed().as_millis() as u64,
        });

        self.report_progress(ProgressUpdate::new(
            ReportStage::Export,
            1.0,
            "Export complete",
        ));

        info!(
            "Analysis finished in {}ms: {} -> {} rows",
            report.duration_ms, report.rows_loaded, report.rows_after_cleaning
        );
        Ok(report)
    }
}

/// Console preview of the processed table.
fn preview_text(df: &DataFrame, rows: usize) -> String {
    format!("Sample of Processed Campaign Data:\n{}", df.head(Some(rows)))
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<ReportConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ReportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let charts = ChartRenderer::new(config.results_dir.clone())
            .with_histogram_bins(config.histogram_bins);
        let reporter = ReportGenerator::new(config.results_dir.clone());

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            cleaner: DataCleaner,
            charts,
            reporter,
        })
    }
}
