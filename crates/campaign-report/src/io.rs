//! CSV input and output for the campaign table.

use crate::error::{ReportError, Result, ResultExt};
use crate::utils::NULL_MARKERS;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Load the campaign CSV.
///
/// Headers are required; the schema is inferred from every row, so a column
/// holding integers until a late fractional value still loads as float. The
/// tokens in [`NULL_MARKERS`] (plus empty fields) are read as nulls.
pub fn load_campaign_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }

    let null_values = NullValues::AllColumns(
        NULL_MARKERS
            .iter()
            .map(|marker| PlSmallStr::from(*marker))
            .collect(),
    );

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Reading {}", path.display()))?;

    debug!("Loaded schema: {:?}", df.schema());
    Ok(df)
}

/// Write the cleaned table, creating the parent directory when needed.
///
/// An existing file at `path` is overwritten.
pub fn write_cleaned_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;

    info!("Cleaned dataset saved: {}", path.display());
    Ok(())
}
