//! Grouped bar chart of a table's numeric columns.
//!
//! [`numeric_chart`] produces the chart model (one group per row, one bar per
//! numeric column); [`render_text`] draws it for a terminal.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

/// One bar per row for a single numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    /// Group labels: the row index of each group.
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl BarChart {
    /// Largest absolute value across all series, ignoring missing values.
    pub fn max_abs(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .map(|v| v.abs())
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }
}

/// Build the chart for every numeric column; `None` when there are none.
///
/// # Errors
///
/// Fails when a numeric column cannot be cast to `Float64`.
pub fn numeric_chart(df: &DataFrame) -> Result<Option<BarChart>> {
    let mut series = Vec::new();
    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }
        let floats = column.as_materialized_series().cast(&DataType::Float64)?;
        series.push(ChartSeries {
            name: column.name().to_string(),
            values: floats.f64()?.into_iter().collect(),
        });
    }

    if series.is_empty() {
        return Ok(None);
    }

    Ok(Some(BarChart {
        labels: (0..df.height()).map(|i| i.to_string()).collect(),
        series,
    }))
}

/// Draw the chart as text, scaling bars so the largest absolute value spans
/// `width` cells. Negative values are drawn with a lighter block.
pub fn render_text(chart: &BarChart, width: usize) -> String {
    let scale = chart.max_abs().filter(|m| *m > 0.0);
    let name_width = chart
        .series
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    let label_width = chart.labels.iter().map(String::len).max().unwrap_or(0);

    let mut lines = Vec::new();
    for (row, label) in chart.labels.iter().enumerate() {
        for (idx, s) in chart.series.iter().enumerate() {
            let prefix = if idx == 0 { label.as_str() } else { "" };
            let bar = match s.values.get(row).copied().flatten() {
                Some(v) if v.is_finite() => {
                    let len = scale.map_or(0, |m| ((v.abs() / m) * width as f64).round() as usize);
                    let block = if v < 0.0 { "░" } else { "█" };
                    format!("{} {v}", block.repeat(len))
                }
                Some(v) => format!("{v}"),
                None => "(missing)".to_owned(),
            };
            lines.push(format!(
                "{prefix:>label_width$} {:<name_width$} | {bar}",
                s.name
            ));
        }
    }
    lines.join("\n")
}
