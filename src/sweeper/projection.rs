use crate::error::{Result, SweeperError};
use polars::prelude::*;
use std::collections::HashSet;

/// Project a table onto exactly `names`, in that order.
///
/// An empty selection is valid and yields a table with no columns that keeps
/// the original row count.
///
/// # Errors
///
/// [`SweeperError::UnknownColumn`] when a name is not in the table and
/// [`SweeperError::DuplicateColumn`] when a name is selected twice; both carry
/// `file_name`.
pub fn select_columns(df: &DataFrame, names: &[String], file_name: &str) -> Result<DataFrame> {
    let existing: HashSet<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    let mut seen = HashSet::with_capacity(names.len());

    for name in names {
        if !existing.contains(name.as_str()) {
            return Err(SweeperError::UnknownColumn {
                file: file_name.to_owned(),
                column: name.clone(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(SweeperError::DuplicateColumn {
                file: file_name.to_owned(),
                column: name.clone(),
            });
        }
    }

    df.select(names.iter().map(String::as_str))
        .map_err(|e| SweeperError::Processing {
            file: file_name.to_owned(),
            reason: format!("column selection failed: {e}"),
        })
}

/// Every column name of a table, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect()
}

/// The first `rows` rows of a table.
pub fn preview(df: &DataFrame, rows: usize) -> DataFrame {
    df.head(Some(rows))
}
