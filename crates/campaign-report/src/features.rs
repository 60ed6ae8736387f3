//! Feature derivation for the campaign table.
//!
//! Adds the ratio metrics (CTR, Conversion_Rate) and ROI, and turns the
//! optional `Date` column into a calendar type.
//!
//! Zero denominators are never allowed to produce `inf`/`NaN`: depending on
//! [`ZeroDenominatorPolicy`] the run either fails or the affected rows are
//! removed before the division.

use crate::config::ZeroDenominatorPolicy;
use crate::error::{ReportError, Result};
use crate::utils::{is_numeric_dtype, is_temporal_dtype, numeric_values};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info, warn};

pub const IMPRESSIONS: &str = "Impressions";
pub const CLICKS: &str = "Clicks";
pub const CONVERSIONS: &str = "Conversions";
pub const SPEND: &str = "Spend";
pub const CLV: &str = "CLV";
pub const DATE: &str = "Date";

pub const CTR: &str = "CTR";
pub const CONVERSION_RATE: &str = "Conversion_Rate";
pub const ROI: &str = "ROI";

/// Columns that must be present (and numeric) in the input.
pub const REQUIRED_COLUMNS: [&str; 5] = [IMPRESSIONS, CLICKS, CONVERSIONS, SPEND, CLV];

/// Regression features, in coefficient order.
pub const MODEL_FEATURES: [&str; 3] = [CTR, CONVERSION_RATE, ROI];

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 8] = [
    IMPRESSIONS,
    CLICKS,
    CONVERSIONS,
    SPEND,
    CLV,
    CTR,
    CONVERSION_RATE,
    ROI,
];

/// Check that every required column exists and is numeric.
pub fn validate_required_columns(df: &DataFrame) -> Result<()> {
    for name in REQUIRED_COLUMNS {
        let col = df
            .column(name)
            .map_err(|_| ReportError::ColumnNotFound(name.to_string()))?;
        if !is_numeric_dtype(col.dtype()) {
            return Err(ReportError::InvalidColumnType {
                column: name.to_string(),
                dtype: col.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Apply the zero-denominator policy.
///
/// Returns the (possibly filtered) frame and any warnings to surface in the
/// run report.
pub fn handle_zero_denominators(
    df: DataFrame,
    policy: ZeroDenominatorPolicy,
) -> Result<(DataFrame, Vec<String>)> {
    let impressions = numeric_values(&df, IMPRESSIONS)?;
    let clicks = numeric_values(&df, CLICKS)?;

    let Some(err) = zero_denominator_error(&impressions, &clicks) else {
        return Ok((df, Vec::new()));
    };

    match policy {
        ZeroDenominatorPolicy::Error => Err(err),
        ZeroDenominatorPolicy::Drop => {
            let zero_impressions = count_zeros(&impressions);
            let zero_clicks = count_zeros(&clicks);
            let keep: Vec<bool> = impressions
                .iter()
                .zip(&clicks)
                .map(|(i, c)| *i != 0.0 && *c != 0.0)
                .collect();
            let mask = BooleanChunked::from_slice("keep".into(), &keep);
            let before = df.height();
            let df = df.filter(&mask)?;
            let removed = before - df.height();

            let warning = format!(
                "Dropped {} row(s) with zero {} or {} ({} zero impressions, {} zero clicks)",
                removed, IMPRESSIONS, CLICKS, zero_impressions, zero_clicks
            );
            warn!("{}", warning);
            Ok((df, vec![warning]))
        }
    }
}

fn count_zeros(values: &[f64]) -> usize {
    values.iter().filter(|v| **v == 0.0).count()
}

/// The [`ReportError::ZeroDenominator`] for the first denominator column
/// holding a zero, Impressions before Clicks.
fn zero_denominator_error(impressions: &[f64], clicks: &[f64]) -> Option<ReportError> {
    [(IMPRESSIONS, impressions), (CLICKS, clicks)]
        .into_iter()
        .map(|(column, values)| (column, count_zeros(values)))
        .find(|(_, rows)| *rows > 0)
        .map(|(column, rows)| ReportError::ZeroDenominator {
            column: column.to_string(),
            rows,
        })
}

/// Add CTR, Conversion_Rate and ROI to the table.
///
/// Existing columns with the same names are replaced. Fails with
/// [`ReportError::ZeroDenominator`] when Impressions or Clicks is zero in any
/// row; use [`handle_zero_denominators`] first to drop such rows instead.
pub fn derive_metrics(df: &mut DataFrame, revenue_per_conversion: f64) -> Result<()> {
    let impressions = numeric_values(df, IMPRESSIONS)?;
    let clicks = numeric_values(df, CLICKS)?;
    if let Some(err) = zero_denominator_error(&impressions, &clicks) {
        return Err(err);
    }
    let conversions = numeric_values(df, CONVERSIONS)?;
    let spend = numeric_values(df, SPEND)?;

    let ctr: Vec<f64> = clicks
        .iter()
        .zip(&impressions)
        .map(|(c, i)| c / i)
        .collect();
    let conversion_rate: Vec<f64> = conversions
        .iter()
        .zip(&clicks)
        .map(|(v, c)| v / c)
        .collect();
    let roi: Vec<f64> = conversions
        .iter()
        .zip(&spend)
        .map(|(v, s)| v * revenue_per_conversion - s)
        .collect();

    df.with_column(Series::new(CTR.into(), ctr))?;
    df.with_column(Series::new(CONVERSION_RATE.into(), conversion_rate))?;
    df.with_column(Series::new(ROI.into(), roi))?;

    debug!("Derived {}, {} and {}", CTR, CONVERSION_RATE, ROI);
    Ok(())
}

/// A single parsed `Date` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// A plain calendar date.
    Day(NaiveDate),
    /// A date with a time of day.
    Moment(NaiveDateTime),
}

impl ParsedDate {
    fn to_datetime(self) -> NaiveDateTime {
        match self {
            ParsedDate::Day(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
            ParsedDate::Moment(dt) => dt,
        }
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse one date string in any of the accepted layouts.
pub fn parse_date_value(raw: &str) -> Option<ParsedDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(ParsedDate::Day(d));
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(ParsedDate::Moment(dt));
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| ParsedDate::Moment(dt.naive_utc()))
}

/// Convert the `Date` column, if present, into a calendar type.
///
/// Produces `Date` when every value is a plain date and `Datetime(ms)` when
/// any value carries a time. Returns whether a `Date` column exists.
pub fn parse_date_column(df: &mut DataFrame) -> Result<bool> {
    let Ok(col) = df.column(DATE) else {
        debug!("No {} column; time series disabled", DATE);
        return Ok(false);
    };

    if is_temporal_dtype(col.dtype()) {
        return Ok(true);
    }

    let as_text = col.as_materialized_series().cast(&DataType::String)?;
    let mut parsed: Vec<Option<ParsedDate>> = Vec::with_capacity(as_text.len());
    for value in as_text.str()?.into_iter() {
        match value {
            Some(raw) => {
                let date = parse_date_value(raw).ok_or_else(|| ReportError::DateParseFailed {
                    value: raw.to_string(),
                })?;
                parsed.push(Some(date));
            }
            None => parsed.push(None),
        }
    }

    let all_days = parsed
        .iter()
        .flatten()
        .all(|d| matches!(d, ParsedDate::Day(_)));

    let series = if all_days {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let days: Vec<Option<i32>> = parsed
            .iter()
            .map(|d| d.map(|d| (d.to_datetime().date() - epoch).num_days() as i32))
            .collect();
        Series::new(DATE.into(), days).cast(&DataType::Date)?
    } else {
        let millis: Vec<Option<i64>> = parsed
            .iter()
            .map(|d| d.map(|d| d.to_datetime().and_utc().timestamp_millis()))
            .collect();
        Series::new(DATE.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
    };

    df.with_column(series)?;
    info!(
        "Parsed {} column as {}",
        DATE,
        if all_days { "dates" } else { "datetimes" }
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> DataFrame {
        df!(
            IMPRESSIONS => &[100i64, 200, 1000],
            CLICKS => &[10i64, 50, 100],
            CONVERSIONS => &[2i64, 5, 30],
            SPEND => &[50.0f64, 400.0, 1000.0],
            CLV => &[300.0f64, 150.0, 900.0]
        )
        .unwrap()
    }

    #[test]
    fn test_derive_metrics_reference_row() {
        let mut df = sample();
        derive_metrics(&mut df, 100.0).unwrap();

        let ctr = numeric_values(&df, CTR).unwrap();
        let rate = numeric_values(&df, CONVERSION_RATE).unwrap();
        let roi = numeric_values(&df, ROI).unwrap();

        assert_relative_eq!(ctr[0], 0.10);
        assert_relative_eq!(rate[0], 0.20);
        assert_relative_eq!(roi[0], 150.0);

        assert_relative_eq!(ctr[1], 0.25);
        assert_relative_eq!(rate[1], 0.10);
        assert_relative_eq!(roi[1], 100.0);
    }

    #[test]
    fn test_derive_metrics_custom_revenue() {
        let mut df = sample();
        derive_metrics(&mut df, 10.0).unwrap();
        let roi = numeric_values(&df, ROI).unwrap();
        assert_relative_eq!(roi[2], 30.0 * 10.0 - 1000.0);
    }

    #[test]
    fn test_derive_metrics_replaces_existing_columns() {
        let mut df = sample();
        df.with_column(Series::new(CTR.into(), &[9.0f64, 9.0, 9.0]))
            .unwrap();
        derive_metrics(&mut df, 100.0).unwrap();
        assert_eq!(df.width(), 8);
        assert_relative_eq!(numeric_values(&df, CTR).unwrap()[0], 0.10);
    }

    #[test]
    fn test_derive_metrics_rejects_zero_denominators() {
        let mut df = df!(
            IMPRESSIONS => &[100i64, 0],
            CLICKS => &[0i64, 0],
            CONVERSIONS => &[0i64, 1],
            SPEND => &[10.0f64, 20.0],
            CLV => &[100.0f64, 200.0]
        )
        .unwrap();

        let err = derive_metrics(&mut df, 100.0).unwrap_err();
        match err {
            ReportError::ZeroDenominator { column, rows } => {
                assert_eq!(column, IMPRESSIONS);
                assert_eq!(rows, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(df.column(CTR).is_err());
    }

    #[test]
    fn test_derive_metrics_rejects_zero_clicks() {
        let mut df = df!(
            IMPRESSIONS => &[100i64, 50],
            CLICKS => &[0i64, 5],
            CONVERSIONS => &[0i64, 1],
            SPEND => &[10.0f64, 20.0],
            CLV => &[100.0f64, 200.0]
        )
        .unwrap();

        let err = derive_metrics(&mut df, 100.0).unwrap_err();
        assert!(matches!(err, ReportError::ZeroDenominator { ref column, rows: 1 } if column == CLICKS));
        assert!(df.column(CONVERSION_RATE).is_err());
    }

    #[test]
    fn test_validate_required_columns() {
        assert!(validate_required_columns(&sample()).is_ok());

        let missing = sample().drop(CLV).unwrap();
        let err = validate_required_columns(&missing).unwrap_err();
        assert!(matches!(err, ReportError::ColumnNotFound(ref c) if c == CLV));
    }

    #[test]
    fn test_zero_denominator_error_policy() {
        let df = df!(
            IMPRESSIONS => &[100i64, 0],
            CLICKS => &[10i64, 0]
        )
        .unwrap();
        let err = handle_zero_denominators(df, ZeroDenominatorPolicy::Error).unwrap_err();
        match err {
            ReportError::ZeroDenominator { column, rows } => {
                assert_eq!(column, IMPRESSIONS);
                assert_eq!(rows, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_clicks_error_names_clicks() {
        let df = df!(
            IMPRESSIONS => &[100i64, 50, 40],
            CLICKS => &[0i64, 0, 4]
        )
        .unwrap();
        let err = handle_zero_denominators(df, ZeroDenominatorPolicy::Error).unwrap_err();
        assert!(matches!(
            err,
            ReportError::ZeroDenominator { ref column, rows: 2 } if column == CLICKS
        ));
    }

    #[test]
    fn test_zero_denominator_drop_policy() {
        let df = df!(
            IMPRESSIONS => &[100i64, 0, 40, 10],
            CLICKS => &[10i64, 0, 0, 1]
        )
        .unwrap();
        let (df, warnings) = handle_zero_denominators(df, ZeroDenominatorPolicy::Drop).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Dropped 2 row(s)"));
    }

    #[test]
    fn test_no_zero_denominators_is_untouched() {
        let (df, warnings) =
            handle_zero_denominators(sample(), ZeroDenominatorPolicy::Error).unwrap();
        assert_eq!(df.height(), 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_date_value_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for raw in ["2024-03-15", "2024/03/15", "03/15/2024", "15.03.2024"] {
            assert_eq!(parse_date_value(raw), Some(ParsedDate::Day(expected)), "{raw}");
        }

        let moment = parse_date_value("2024-03-15 08:30:00").unwrap();
        assert_eq!(
            moment,
            ParsedDate::Moment(expected.and_hms_opt(8, 30, 0).unwrap())
        );
        assert!(matches!(
            parse_date_value("2024-03-15T08:30:00+02:00"),
            Some(ParsedDate::Moment(_))
        ));
        assert_eq!(parse_date_value("next tuesday"), None);
        assert_eq!(parse_date_value("  "), None);
    }

    #[test]
    fn test_parse_date_column_to_date() {
        let mut df = df!(DATE => &["2024-01-01", "2024-01-02"]).unwrap();
        assert!(parse_date_column(&mut df).unwrap());
        assert_eq!(df.column(DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_parse_date_column_with_times() {
        let mut df = df!(DATE => &["2024-01-01", "2024-01-02 12:00:00"]).unwrap();
        parse_date_column(&mut df).unwrap();
        assert_eq!(
            df.column(DATE).unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }

    #[test]
    fn test_parse_date_column_invalid_value() {
        let mut df = df!(DATE => &["2024-01-01", "soon"]).unwrap();
        let err = parse_date_column(&mut df).unwrap_err();
        assert!(matches!(err, ReportError::DateParseFailed { ref value } if value == "soon"));
    }

    #[test]
    fn test_parse_date_column_absent() {
        let mut df = sample();
        assert!(!parse_date_column(&mut df).unwrap());
    }
}
