//! Run report generation.
//!
//! [`ReportGenerator::build_report`] turns a finished run into an
//! [`AnalysisReport`](crate::types::AnalysisReport), which can be:
//! - printed as JSON to stdout (`--json` CLI flag)
//! - written to `analysis_report.json` (`--emit-report` CLI flag)
//! - printed as a human-readable summary
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_report::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new(PathBuf::from("results"));
//! generator.write_report_to_file(&report)?;
//! ```

mod generator;

pub use generator::{
    REPORT_FILE_NAME, ReportGenerator, ReportParams, print_human_readable_summary,
};
