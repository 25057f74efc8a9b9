use super::excel;
use super::types::{ExportArtifact, ExportFormat, LoadOptions, SourceFormat, UploadedFile};
use crate::error::{Result, SweeperError};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

/// Markers read as missing in CSV input, on top of empty fields.
const CSV_NULL_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Parse an upload into a typed table.
///
/// Dispatches on the (case-insensitive) extension. Every column of the result
/// has already been through [`normalize_types`].
///
/// # Errors
///
/// Returns [`SweeperError::Load`] naming the file when the extension is not
/// supported or the content cannot be parsed.
pub fn load(file: &UploadedFile, options: &LoadOptions) -> Result<DataFrame> {
    let ext = file.extension();
    let format = SourceFormat::from_extension(&ext).ok_or_else(|| {
        SweeperError::load(
            file.name(),
            if ext.is_empty() {
                "file has no extension (expected .csv or .xlsx)".to_owned()
            } else {
                format!("unsupported file extension '.{ext}' (expected .csv or .xlsx)")
            },
        )
    })?;

    let df = match format {
        SourceFormat::Csv => {
            read_csv(file.bytes(), options).map_err(|e| SweeperError::load(file.name(), e))?
        }
        SourceFormat::Excel => excel::read_workbook(file.bytes())
            .map_err(|e| SweeperError::load(file.name(), format!("{e:#}")))?,
    };

    let df = normalize_types(df).map_err(|e| SweeperError::load(file.name(), e))?;
    tracing::debug!(
        file = file.name(),
        rows = df.height(),
        columns = df.width(),
        "Loaded table"
    );
    Ok(df)
}

fn read_csv(bytes: &[u8], options: &LoadOptions) -> PolarsResult<DataFrame> {
    let mut df = match read_csv_with(bytes, Some(options.infer_schema_length)) {
        Ok(df) => df,
        Err(e) => {
            // a type change past the inference window; scan everything instead
            tracing::warn!(
                "CSV read failed with {} inferred rows ({e}), retrying with a full scan",
                options.infer_schema_length
            );
            read_csv_with(bytes, None)?
        }
    };

    let names = unique_names(original_csv_headers(&df));
    df.set_column_names(names)?;
    Ok(df)
}

fn read_csv_with(bytes: &[u8], infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    let null_values = NullValues::AllColumns(CSV_NULL_MARKERS.iter().map(|m| (*m).into()).collect());

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .map_parse_options(|parse| parse.with_null_values(Some(null_values.clone())))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

/// Header row as written in the file: the reader renames a repeated `a` to
/// `a_duplicated_0`, `a_duplicated_1`, ...; those go back to `a`.
fn original_csv_headers(df: &DataFrame) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(df.width());
    for name in df.get_column_names() {
        let original = name
            .as_str()
            .rsplit_once("_duplicated_")
            .filter(|&(base, n)| {
                n.parse::<usize>().is_ok() && headers.iter().any(|h| h == base)
            })
            .map_or(name.as_str(), |(base, _)| base);
        headers.push(original.to_owned());
    }
    headers
}

/// Make column names unique: the first `a` keeps its name, later ones become
/// `a.1`, `a.2`, ... (skipping names already taken).
pub(crate) fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|base| {
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Coerce columns the rest of the pipeline cannot render or export to strings.
///
/// Numeric, boolean, string and temporal columns pass through untouched.
/// Anything else (an all-missing `Null` column, lists, structs, binary) is cast
/// to its string form. Structured values lose their structure here.
///
/// # Errors
///
/// Fails when a column has no string representation.
pub fn normalize_types(df: DataFrame) -> PolarsResult<DataFrame> {
    let needs_cast = |dtype: &DataType| {
        !(dtype.is_primitive_numeric() || dtype.is_bool() || dtype.is_string() || dtype.is_temporal())
    };

    if !df.get_columns().iter().any(|c| needs_cast(c.dtype())) {
        return Ok(df);
    }

    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        if needs_cast(column.dtype()) {
            tracing::debug!(
                column = column.name().as_str(),
                dtype = %column.dtype(),
                "Coercing column to string"
            );
            columns.push(column.cast(&DataType::String)?);
        } else {
            columns.push(column.clone());
        }
    }
    DataFrame::new(columns)
}

/// Output name for a converted upload: the original stem plus the target extension.
pub fn export_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = std::path::Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.to_owned());
    format!("{stem}.{}", format.extension())
}

/// Serialize a table into a downloadable artifact.
///
/// # Errors
///
/// Returns [`SweeperError::Export`] naming `source_name` when a value cannot
/// be represented in the target format.
pub fn export(df: &DataFrame, format: ExportFormat, source_name: &str) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(df),
        ExportFormat::Excel => excel::write_workbook(df),
    }
    .map_err(|e| SweeperError::export(source_name, format!("{e:#}")))?;

    let file_name = export_file_name(source_name, format);
    tracing::info!(
        file = source_name,
        output = %file_name,
        bytes = bytes.len(),
        "Converted to {format}"
    );

    Ok(ExportArtifact {
        file_name,
        mime_type: format.mime_type(),
        bytes,
    })
}

fn write_csv(df: &DataFrame) -> anyhow::Result<Vec<u8>> {
    if df.width() == 0 {
        // no columns left: an empty header field and one empty record per row
        let mut buffer = b"\"\"\n".to_vec();
        buffer.resize(buffer.len() + df.height(), b'\n');
        return Ok(buffer);
    }

    let mut df = df.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buffer)
}
