use super::types::CleaningStep;
use anyhow::{Context as _, Result};
use polars::prelude::*;

/// Outcome of running one cleaning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    DuplicatesRemoved(usize),
    MissingFilled { columns: usize },
}

impl StepOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::DuplicatesRemoved(n) => format!("Removed {n} duplicate rows."),
            Self::MissingFilled { .. } => "Missing values filled with column means.".to_owned(),
        }
    }
}

/// Drop rows that repeat an earlier row across every column.
///
/// Missing cells compare equal to each other. The first occurrence is kept and
/// the relative order of the remaining rows is preserved. Returns the
/// deduplicated table and how many rows were dropped.
///
/// # Errors
///
/// Fails when the engine cannot hash a column type.
pub fn remove_duplicates(df: &DataFrame) -> Result<(DataFrame, usize)> {
    if df.width() == 0 || df.height() < 2 {
        return Ok((df.clone(), 0));
    }

    let deduped = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .context("Failed to remove duplicate rows")?;

    let removed = df.height() - deduped.height();
    Ok((deduped, removed))
}

/// Columns eligible for mean imputation: numeric, with at least one missing
/// and at least one present value.
fn fillable(column: &Column) -> bool {
    let nulls = column.null_count();
    column.dtype().is_primitive_numeric() && nulls > 0 && nulls < column.len()
}

/// Replace missing numeric values with their column's arithmetic mean.
///
/// The mean is taken over the table as it is now, so a previous
/// [`remove_duplicates`] changes it. Filled columns become `Float64`. An
/// infinite mean is used as is; a NaN mean (no present values, or both `inf`
/// and `-inf`) leaves the column unchanged, as do non-numeric columns.
///
/// # Errors
///
/// Fails when a numeric column cannot be cast to `Float64`.
pub fn fill_missing_numeric(df: &DataFrame) -> Result<(DataFrame, usize)> {
    if !df.get_columns().iter().any(fillable) {
        return Ok((df.clone(), 0));
    }

    let mut filled = 0;
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        if !fillable(column) {
            columns.push(column.clone());
            continue;
        }

        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .with_context(|| format!("Failed to cast '{}' to float", column.name()))?;
        let ca = series.f64()?;

        match ca.mean() {
            Some(mean) if !mean.is_nan() => {
                let ca = ca.fill_null_with_values(mean)?;
                tracing::debug!(column = column.name().as_str(), mean, "Filled missing values");
                columns.push(Column::from(ca.into_series()));
                filled += 1;
            }
            _ => columns.push(column.clone()),
        }
    }

    let df = DataFrame::new(columns).context("Failed to rebuild table after filling")?;
    Ok((df, filled))
}

/// Run cleaning steps in the given order, each on the previous step's output.
///
/// # Errors
///
/// Stops at the first step that fails and returns its error.
pub fn apply_steps(
    mut df: DataFrame,
    steps: &[CleaningStep],
) -> Result<(DataFrame, Vec<StepOutcome>)> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        let outcome = match step {
            CleaningStep::RemoveDuplicates => {
                let (next, removed) = remove_duplicates(&df)?;
                df = next;
                StepOutcome::DuplicatesRemoved(removed)
            }
            CleaningStep::FillMissing => {
                let (next, columns) = fill_missing_numeric(&df)?;
                df = next;
                StepOutcome::MissingFilled { columns }
            }
        };
        tracing::info!("{}: {}", step.as_str(), outcome.message());
        outcomes.push(outcome);
    }
    Ok((df, outcomes))
}
