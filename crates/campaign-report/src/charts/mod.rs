//! PNG chart rendering with plotters.
//!
//! [`ChartRenderer`] writes each chart into the results directory and
//! returns a [`ChartArtifact`] naming the file. Every drawing area is
//! presented and dropped before the next chart starts.
//!
//! Text is rendered through the system font stack, so rendering needs at
//! least one installed sans-serif font.

mod distribution;
mod heatmap;
mod scatter;
mod time_series;

pub use heatmap::{coolwarm, correlation_color};
pub use scatter::shared_range;
pub use time_series::{format_millis, roi_by_date};

use crate::error::{ReportError, Result};
use crate::features::{CONVERSION_RATE, CTR, ROI};
use crate::stats::{CorrelationMatrix, sturges_bins};
use crate::types::{ChartArtifact, ChartKind};
use crate::utils::numeric_values;
use distribution::{HistogramPanel, draw_histograms};
use plotters::style::RGBColor;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const SERIES_COLOR: RGBColor = RGBColor(31, 119, 180);

const METRICS_SIZE: (u32, u32) = (1800, 500);
const HEATMAP_SIZE: (u32, u32) = (1000, 800);
const TIME_SERIES_SIZE: (u32, u32) = (1200, 600);
const SCATTER_SIZE: (u32, u32) = (800, 600);
const RESIDUAL_SIZE: (u32, u32) = (800, 600);

/// Renders the analysis charts into one output directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    histogram_bins: usize,
}

impl ChartRenderer {
    /// Create a renderer writing into `output_dir` with 20 histogram bins.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            histogram_bins: 20,
        }
    }

    /// Set the bin count of the metric histograms.
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// CTR, Conversion Rate and ROI histograms side by side.
    pub fn metrics_distribution(&self, df: &DataFrame) -> Result<ChartArtifact> {
        let ctr = numeric_values(df, CTR)?;
        let rate = numeric_values(df, CONVERSION_RATE)?;
        let roi = numeric_values(df, ROI)?;

        let bins = self.histogram_bins;
        let panels = [
            metric_panel("CTR Distribution", CTR, &ctr, bins),
            metric_panel("Conversion Rate Distribution", CONVERSION_RATE, &rate, bins),
            metric_panel("ROI Distribution", ROI, &roi, bins),
        ];

        self.render(ChartKind::MetricsDistribution, |path| {
            draw_histograms(path, METRICS_SIZE, &panels)
        })
    }

    /// Annotated heatmap of a correlation matrix.
    pub fn correlation_heatmap(&self, matrix: &CorrelationMatrix) -> Result<ChartArtifact> {
        self.render(ChartKind::CorrelationHeatmap, |path| {
            heatmap::draw_heatmap(path, HEATMAP_SIZE, matrix)
        })
    }

    /// Line chart of total ROI per date. Requires a parsed `Date` column.
    pub fn roi_time_series(&self, df: &DataFrame) -> Result<ChartArtifact> {
        let series = roi_by_date(df)?;
        debug!("ROI time series spans {} dates", series.len());

        self.render(ChartKind::RoiTimeSeries, |path| {
            time_series::draw_time_series(path, TIME_SERIES_SIZE, &series)
        })
    }

    /// Scatter of test-set CLV against predictions with a dashed diagonal.
    pub fn actual_vs_predicted(&self, actual: &[f64], predicted: &[f64]) -> Result<ChartArtifact> {
        self.render(ChartKind::ActualVsPredicted, |path| {
            scatter::draw_actual_vs_predicted(path, SCATTER_SIZE, actual, predicted)
        })
    }

    /// Histogram of residuals, binned by Sturges' rule.
    pub fn residual_distribution(&self, residuals: &[f64]) -> Result<ChartArtifact> {
        let panels = [HistogramPanel {
            title: "Distribution of Residuals",
            x_desc: "Residual Error",
            y_desc: "Frequency",
            values: residuals,
            bins: sturges_bins(residuals.len()),
        }];

        self.render(ChartKind::ResidualDistribution, |path| {
            draw_histograms(path, RESIDUAL_SIZE, &panels)
        })
    }

    fn render<F>(&self, kind: ChartKind, draw: F) -> Result<ChartArtifact>
    where
        F: FnOnce(&Path) -> DrawResult,
    {
        let artifact = ChartArtifact::new(kind, &self.output_dir);
        draw(&artifact.path).map_err(|e| ReportError::chart(kind.file_name(), e))?;
        info!("Saved {} to {}", kind.display_name(), artifact.path.display());
        Ok(artifact)
    }
}

fn metric_panel<'a>(
    title: &'a str,
    column: &'a str,
    values: &'a [f64],
    bins: usize,
) -> HistogramPanel<'a> {
    HistogramPanel {
        title,
        x_desc: column,
        y_desc: "Count",
        values,
        bins,
    }
}
