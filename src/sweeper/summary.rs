use super::types::{ColumnSummary, SummaryStats};
use anyhow::Result;
use polars::prelude::*;

/// Descriptive statistics for every numeric column, in column order.
///
/// `std` is the sample standard deviation (ddof = 1) and quartiles use linear
/// interpolation. Boolean, text and temporal columns are skipped.
///
/// # Errors
///
/// Fails when a numeric column cannot be cast to `Float64`.
pub fn compute_summary(df: &DataFrame) -> Result<SummaryStats> {
    let mut columns = Vec::new();

    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }

        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        let ca = series.f64()?;

        columns.push(ColumnSummary {
            name: column.name().to_string(),
            count: ca.len() - ca.null_count(),
            mean: ca.mean(),
            std: ca.std(1),
            min: ca.min(),
            q1: ca.quantile(0.25, QuantileMethod::Linear)?,
            median: ca.quantile(0.5, QuantileMethod::Linear)?,
            q3: ca.quantile(0.75, QuantileMethod::Linear)?,
            max: ca.max(),
        });
    }

    Ok(SummaryStats { columns })
}

/// Render statistics as an aligned text table, one row per statistic and one
/// column per numeric column.
pub fn render_summary(stats: &SummaryStats) -> String {
    if stats.is_empty() {
        return "No numeric columns to summarize.".to_owned();
    }

    let fmt_opt = |v: Option<f64>| match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "NaN".to_owned(),
    };

    let mut rows: Vec<(&str, Vec<String>)> = vec![
        ("count", stats.columns.iter().map(|c| c.count.to_string()).collect()),
        ("mean", stats.columns.iter().map(|c| fmt_opt(c.mean)).collect()),
        ("std", stats.columns.iter().map(|c| fmt_opt(c.std)).collect()),
        ("min", stats.columns.iter().map(|c| fmt_opt(c.min)).collect()),
        ("25%", stats.columns.iter().map(|c| fmt_opt(c.q1)).collect()),
        ("50%", stats.columns.iter().map(|c| fmt_opt(c.median)).collect()),
        ("75%", stats.columns.iter().map(|c| fmt_opt(c.q3)).collect()),
        ("max", stats.columns.iter().map(|c| fmt_opt(c.max)).collect()),
    ];

    let widths: Vec<usize> = stats
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .filter_map(|(_, cells)| cells.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(c.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format!("{:<6}", "");
    for (c, w) in stats.columns.iter().zip(&widths) {
        out.push_str(&format!("  {:>w$}", c.name, w = *w));
    }
    for (label, cells) in rows.drain(..) {
        out.push('\n');
        out.push_str(&format!("{label:<6}"));
        for (cell, w) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {cell:>w$}", w = *w));
        }
    }
    out
}
