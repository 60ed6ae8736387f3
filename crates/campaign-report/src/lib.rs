//! Marketing Campaign Report Library
//!
//! Exploratory analysis of marketing campaign data built with Rust, Polars
//! and plotters.
//!
//! # Overview
//!
//! One run of the [`Pipeline`]:
//!
//! - **Loading**: reads the campaign CSV, treating common NA markers as nulls
//! - **Cleaning**: drops every row with a missing value
//! - **Feature Derivation**: adds CTR, Conversion_Rate and ROI and parses `Date`
//! - **Visualization**: metric histograms, a correlation heatmap and, when
//!   dates are present, total ROI over time
//! - **Modeling**: an 80/20 split and a least-squares regression predicting CLV,
//!   scored by mean squared error and charted against the test set
//! - **Export**: the cleaned, feature-augmented CSV and an optional JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use campaign_report::{Pipeline, ReportConfig, ZeroDenominatorPolicy};
//!
//! let config = ReportConfig::builder()
//!     .input_path("data/campaign_data.csv")
//!     .results_dir("results")
//!     .zero_denominator(ZeroDenominatorPolicy::Drop)
//!     .build()?;
//!
//! let report = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Mean Squared Error: {:.2}", report.regression.mse);
//! ```
//!
//! # Building Blocks
//!
//! Every stage is also usable on its own:
//!
//! ```rust,ignore
//! use campaign_report::{features, io, model};
//!
//! let mut df = io::load_campaign_csv("data/campaign_data.csv".as_ref())?;
//! features::derive_metrics(&mut df, 100.0)?;
//! let evaluation = model::evaluate_clv_model(&df, 0.2, 42)?;
//! ```

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod reporting;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::ChartRenderer;
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder, ZeroDenominatorPolicy};
pub use error::{ReportError, Result as ReportResult, ResultExt};
pub use model::{LinearRegression, ModelEvaluation, TrainTestSplit, evaluate_clv_model};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter, ProgressUpdate,
    ReportStage,
};
pub use reporting::{ReportGenerator, ReportParams};
pub use stats::CorrelationMatrix;
pub use types::{AnalysisReport, ChartArtifact, ChartKind, RegressionSummary};
pub use utils::{is_numeric_dtype, is_temporal_dtype};
