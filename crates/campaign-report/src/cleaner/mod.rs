//! Data cleaning for the campaign table.
//!
//! The analysis needs complete records: any row holding a null in any
//! column is removed before metrics are derived.

use crate::error::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for the campaign table.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop every row that has a null in any column.
    ///
    /// Returns the cleaned frame and the list of cleaning actions performed.
    pub fn drop_missing_rows(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut cleaning_actions = Vec::new();

        info!("Dropping rows with missing values...");

        let before_rows = df.height();
        let nulls_per_column: Vec<(String, usize)> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect();

        for (name, count) in &nulls_per_column {
            debug!("Column '{}' has {} missing value(s)", name, count);
        }

        let df = df.drop_nulls::<String>(None)?;
        let rows_removed = before_rows - df.height();

        if rows_removed > 0 {
            let pct = (rows_removed as f64 / before_rows as f64) * 100.0;
            let columns: Vec<&str> = nulls_per_column.iter().map(|(n, _)| n.as_str()).collect();
            cleaning_actions.push(format!(
                "Removed {} rows with missing values ({:.1}%) in columns {:?}",
                rows_removed, pct, columns
            ));
            debug!("Removed {} rows with missing values", rows_removed);
        } else {
            cleaning_actions.push("No rows with missing values found".to_string());
        }

        Ok((df, cleaning_actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_missing_rows_removes_any_null() {
        let df = df!(
            "Clicks" => &[Some(1i64), None, Some(3), Some(4)],
            "Spend" => &[Some(1.0f64), Some(2.0), None, Some(4.0)],
            "Channel" => &[Some("email"), Some("social"), Some("search"), None]
        )
        .unwrap();

        let (cleaned, actions) = DataCleaner.drop_missing_rows(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert!(cleaned.get_columns().iter().all(|c| c.null_count() == 0));
        assert_eq!(actions.len(), 1);
        assert!(actions[0].starts_with("Removed 3 rows"));
    }

    #[test]
    fn test_drop_missing_rows_no_nulls() {
        let df = df!("Clicks" => &[1i64, 2, 3]).unwrap();
        let (cleaned, actions) = DataCleaner.drop_missing_rows(df).unwrap();
        assert_eq!(cleaned.height(), 3);
        assert_eq!(actions, vec!["No rows with missing values found".to_string()]);
    }

    #[test]
    fn test_drop_missing_rows_all_null_rows() {
        let df = df!("Clicks" => &[None::<i64>, None]).unwrap();
        let (cleaned, _) = DataCleaner.drop_missing_rows(df).unwrap();
        assert_eq!(cleaned.height(), 0);
    }
}
