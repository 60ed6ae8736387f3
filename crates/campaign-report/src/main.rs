//! CLI entry point for the campaign report.

use anyhow::{Result, anyhow};
use campaign_report::{
    Pipeline, ReportConfig, ReportError, ZeroDenominatorPolicy,
    reporting::print_human_readable_summary,
};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible zero-denominator policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliZeroDenominator {
    /// Fail when Impressions or Clicks is zero
    Error,
    /// Drop rows where Impressions or Clicks is zero
    Drop,
}

impl From<CliZeroDenominator> for ZeroDenominatorPolicy {
    fn from(cli: CliZeroDenominator) -> Self {
        match cli {
            CliZeroDenominator::Error => ZeroDenominatorPolicy::Error,
            CliZeroDenominator::Drop => ZeroDenominatorPolicy::Drop,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Marketing campaign analysis: metrics, charts and a CLV regression",
    long_about = "Loads a campaign CSV, drops incomplete rows, derives CTR, Conversion_Rate \
                  and ROI, renders exploratory charts, fits a linear regression predicting \
                  CLV and exports the cleaned table.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG              Overrides --log-level (e.g. RUST_LOG=debug)\n\n\
                  EXAMPLES:\n  \
                  # Default layout: data/campaign_data.csv -> results/\n  \
                  campaign-report\n\n  \
                  # Custom input and output locations\n  \
                  campaign-report -i q3.csv -o q3_results --cleaned-output q3_clean.csv\n\n  \
                  # Drop zero-click rows instead of failing\n  \
                  campaign-report --zero-denominator drop\n\n  \
                  # Machine-readable report\n  \
                  campaign-report --json | jq .regression.mse"
)]
struct Args {
    /// Path to the campaign CSV
    #[arg(short, long, default_value = campaign_report::config::DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Directory for chart images and the JSON report
    #[arg(short = 'o', long, default_value = campaign_report::config::DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// Path of the cleaned CSV export
    #[arg(long, default_value = campaign_report::config::DEFAULT_CLEANED_OUTPUT)]
    cleaned_output: PathBuf,

    /// Fraction of rows held out for testing the model (0.0 - 1.0, exclusive)
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Revenue credited per conversion when computing ROI
    #[arg(long, default_value = "100.0")]
    revenue_per_conversion: f64,

    /// What to do with rows whose Impressions or Clicks is zero
    #[arg(long, value_enum, default_value = "error")]
    zero_denominator: CliZeroDenominator,

    /// Number of rows shown in the table preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Skip rendering the PNG charts
    #[arg(long)]
    no_charts: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs and the table preview; only outputs the
    /// final JSON report. Useful for piping: `... --json | jq .regression`
    #[arg(long)]
    json: bool,

    /// Write the JSON report to <results_dir>/analysis_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = ReportConfig::builder()
        .input_path(&args.input)
        .results_dir(&args.results_dir)
        .cleaned_output(&args.cleaned_output)
        .test_size(args.test_size)
        .seed(args.seed)
        .revenue_per_conversion(args.revenue_per_conversion)
        .zero_denominator(args.zero_denominator.into())
        .preview_rows(args.preview_rows)
        .render_charts(!args.no_charts)
        .print_summary(!args.json)
        .build()?;

    let pipeline = build_pipeline(&args, config)?;

    info!("{}", "=".repeat(80));
    info!("Starting campaign analysis...");
    info!("{}", "=".repeat(80));

    let report = match pipeline.run() {
        Ok(report) => report,
        Err(e) => {
            if args.json {
                println!("{}", error_json(&e)?);
            }
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed [{}]: {}", e.error_code(), e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = pipeline.write_report(&report)?;
        info!("Report written to: {}", report_path.display());
    }

    if !args.quiet {
        print_human_readable_summary(&report);
        println!("Use --json for machine-readable output");
        println!("Use --emit-report to save the JSON report");
        println!("{}", "=".repeat(80));
    }

    Ok(())
}

/// `--json` output of a failed run: `{"error": {"code": ..., "message": ...}}`.
#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'a ReportError,
}

fn error_json(err: &ReportError) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ErrorOutput { error: err })
}

fn build_pipeline(args: &Args, config: ReportConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["campaign-report"]);
        assert_eq!(args.input, PathBuf::from("data/campaign_data.csv"));
        assert_eq!(args.results_dir, PathBuf::from("results"));
        assert_eq!(args.cleaned_output, PathBuf::from("data/cleaned_campaign_data.csv"));
        assert_eq!(args.seed, 42);
        assert!((args.test_size - 0.2).abs() < f64::EPSILON);
        assert!(matches!(args.zero_denominator, CliZeroDenominator::Error));
        assert!(!args.no_charts && !args.json && !args.emit_report);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from([
            "campaign-report",
            "-i",
            "q3.csv",
            "-o",
            "out",
            "--zero-denominator",
            "drop",
            "--no-charts",
            "--json",
            "-r",
        ]);
        assert_eq!(args.input, PathBuf::from("q3.csv"));
        assert_eq!(args.results_dir, PathBuf::from("out"));
        assert_eq!(
            ZeroDenominatorPolicy::from(args.zero_denominator),
            ZeroDenominatorPolicy::Drop
        );
        assert!(args.no_charts && args.json && args.emit_report);
    }

    #[test]
    fn test_error_json_shape() {
        let err = ReportError::ZeroDenominator {
            column: "Clicks".to_string(),
            rows: 2,
        };
        let value: serde_json::Value = serde_json::from_str(&error_json(&err).unwrap()).unwrap();
        assert_eq!(value["error"]["code"], "ZERO_DENOMINATOR");
        assert_eq!(
            value["error"]["message"],
            "Column 'Clicks' is zero in 2 row(s); ratio metrics would be undefined"
        );
    }

    #[test]
    fn test_args_reject_unknown_policy() {
        assert!(Args::try_parse_from(["campaign-report", "--zero-denominator", "skip"]).is_err());
    }
}
