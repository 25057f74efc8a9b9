//! Office Open XML workbooks.
//!
//! Reading goes through `calamine` (first worksheet, first row is the header);
//! writing goes through `rust_xlsxwriter` (a single `Sheet1`, header row, no
//! index column). Column types are decided once per column while reading, so
//! downstream code only ever sees numeric, boolean or string columns.

use super::io::unique_names;
use anyhow::{Context as _, Result, bail};
use calamine::{Data, DataType as _, Reader as _, Xlsx, open_workbook_from_rs};
use chrono::{NaiveDateTime, NaiveTime};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

/// Rows an Excel worksheet can hold, header included.
pub const MAX_SHEET_ROWS: usize = 1_048_576;
/// Columns an Excel worksheet can hold.
pub const MAX_SHEET_COLUMNS: usize = 16_384;
/// Characters a single Excel cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// A worksheet cell reduced to the kinds a table column can carry.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
    Missing,
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Missing,
            Data::Int(i) => Self::Int(*i),
            Data::Float(f) => Self::Float(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::String(s) => Self::Text(s.clone()),
            Data::DateTime(_) => match data.as_datetime() {
                Some(dt) => Self::DateTime(dt),
                None => Self::Text(data.to_string()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Error(e) => Self::Text(e.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(true) => Some("True".to_owned()),
            Self::Bool(false) => Some("False".to_owned()),
            Self::Text(s) => Some(s.clone()),
            Self::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
            Self::Missing => None,
        }
    }
}

/// Workbook dates are carried as text in these layouts; a column whose dates
/// all fall on midnight uses the date-only one.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Integral floats that survive a round trip through `i64`.
fn as_integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

/// Build one typed column from the cells below a header.
fn build_column(name: &str, cells: &[Cell]) -> Column {
    let present = || cells.iter().filter(|c| **c != Cell::Missing);

    let all_numeric = present().all(|c| matches!(c, Cell::Int(_) | Cell::Float(_)));
    let all_bool = present().all(|c| matches!(c, Cell::Bool(_)));
    let any_present = present().next().is_some();

    let series = if any_present && all_numeric {
        let all_integral = present().all(|c| match c {
            Cell::Int(_) => true,
            Cell::Float(f) => as_integral(*f).is_some(),
            _ => false,
        });
        if all_integral {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Cell::Int(i) => Some(*i),
                    Cell::Float(f) => as_integral(*f),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        } else {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Cell::Int(i) => Some(*i as f64),
                    Cell::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
    } else if any_present && all_bool {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Cell::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if any_present
        && present().all(|c| matches!(c, Cell::DateTime(dt) if dt.time() == NaiveTime::MIN))
    {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| match c {
                Cell::DateTime(dt) => Some(dt.format(DATE_FORMAT).to_string()),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(Cell::as_text).collect();
        Series::new(name.into(), values)
    };

    Column::from(series)
}

/// Header names for a sheet: blanks become `Unnamed: <index>`, repeats get a
/// `.1`, `.2`, ... suffix so every name is unique.
fn header_names(header: &[Data]) -> Vec<String> {
    unique_names(header.iter().enumerate().map(|(idx, cell)| {
        match Cell::from_data(cell).as_text() {
            Some(text) if !text.trim().is_empty() => text,
            _ => format!("Unnamed: {idx}"),
        }
    }))
}

/// Parse the first worksheet of an `.xlsx` payload.
///
/// # Errors
///
/// Fails for a corrupt workbook or one without worksheets.
pub fn read_workbook(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .context("Failed to open Excel workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook contains no worksheets")?
        .context("Failed to read first worksheet")?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let names = header_names(header);

    let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(range.height()); names.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).map_or(Cell::Missing, Cell::from_data));
        }
    }

    let columns = names
        .iter()
        .zip(&cells)
        .map(|(name, column)| build_column(name, column))
        .collect::<Vec<_>>();

    DataFrame::new(columns).context("Failed to assemble table from worksheet")
}

/// Serialize a table as a single-sheet `.xlsx` workbook.
///
/// # Errors
///
/// Fails when the table exceeds the sheet limits, holds NaN or infinite
/// numbers, or has text longer than a cell allows.
pub fn write_workbook(df: &DataFrame) -> Result<Vec<u8>> {
    if df.height() + 1 > MAX_SHEET_ROWS {
        bail!(
            "{} rows do not fit in an Excel worksheet (limit {})",
            df.height(),
            MAX_SHEET_ROWS - 1
        );
    }
    if df.width() > MAX_SHEET_COLUMNS {
        bail!(
            "{} columns do not fit in an Excel worksheet (limit {MAX_SHEET_COLUMNS})",
            df.width()
        );
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();

        for (col_idx, column) in df.get_columns().iter().enumerate() {
            let col = u16::try_from(col_idx).context("Column index out of range")?;
            let name = column.name().as_str();
            sheet
                .write_string(0, col, name)
                .with_context(|| format!("Failed to write header '{name}'"))?;

            let series = column.as_materialized_series();
            let dtype = series.dtype();

            if dtype.is_bool() {
                for (row_idx, value) in series.bool()?.into_iter().enumerate() {
                    if let Some(b) = value {
                        sheet.write_boolean(sheet_row(row_idx)?, col, b)?;
                    }
                }
            } else if dtype.is_primitive_numeric() {
                let floats = series.cast(&DataType::Float64)?;
                for (row_idx, value) in floats.f64()?.into_iter().enumerate() {
                    if let Some(f) = value {
                        if !f.is_finite() {
                            bail!("Column '{name}' row {row_idx}: {f} is not representable in Excel");
                        }
                        sheet.write_number(sheet_row(row_idx)?, col, f)?;
                    }
                }
            } else {
                let strings = series.cast(&DataType::String)?;
                for (row_idx, value) in strings.str()?.into_iter().enumerate() {
                    if let Some(s) = value {
                        if s.chars().count() > MAX_CELL_CHARS {
                            bail!(
                                "Column '{name}' row {row_idx}: text longer than {MAX_CELL_CHARS} characters"
                            );
                        }
                        sheet.write_string(sheet_row(row_idx)?, col, s)?;
                    }
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .context("Failed to serialize Excel workbook")
}

/// Worksheet row for a table row; row 0 holds the header.
fn sheet_row(row_idx: usize) -> Result<u32> {
    u32::try_from(row_idx + 1).context("Row index out of range")
}
