//! Progress reporting for the campaign report pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_report::Pipeline;
//!
//! let report = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the campaign report pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    /// Reading the input CSV
    Loading,
    /// Dropping rows with missing values
    Cleaning,
    /// Computing CTR, Conversion_Rate and ROI and parsing dates
    FeatureDerivation,
    /// Rendering the exploratory charts
    Visualization,
    /// Fitting and evaluating the CLV regression
    Modeling,
    /// Writing the cleaned CSV and the run report
    Export,
    /// Every stage finished
    Complete,
    /// A stage returned an error
    Failed,
}

impl ReportStage {
    /// Label used in progress logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Data",
            Self::FeatureDerivation => "Deriving Features",
            Self::Visualization => "Rendering Charts",
            Self::Modeling => "Modeling CLV",
            Self::Export => "Exporting Results",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run taken by this stage.
    ///
    /// Weights of the working stages sum to 1.0; chart rendering dominates.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Cleaning => 0.10,
            Self::FeatureDerivation => 0.10,
            Self::Visualization => 0.35,
            Self::Modeling => 0.25,
            Self::Export => 0.10,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Overall progress when this stage starts.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.10,
            Self::FeatureDerivation => 0.20,
            Self::Visualization => 0.30,
            Self::Modeling => 0.65,
            Self::Export => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stage that emitted the update
    pub stage: ReportStage,

    /// Overall progress in [0, 1]
    pub progress: f32,

    /// Progress within the stage in [0, 1]
    pub stage_progress: f32,

    /// What the stage is doing
    pub message: String,
}

impl ProgressUpdate {
    /// Update for `stage`, `stage_progress` of the way through it.
    pub fn new(stage: ReportStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Final update of a successful run.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: ReportStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Final update of a failed run.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: ReportStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receiver of [`ProgressUpdate`]s during a run.
///
/// # Example
///
/// ```rust,ignore
/// use campaign_report::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
