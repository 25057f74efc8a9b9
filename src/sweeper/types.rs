use crate::error::{Result, SweeperError};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One user upload: raw bytes plus the name they arrived under.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an upload from disk; the file name (not the full path) becomes its name.
    ///
    /// # Errors
    ///
    /// [`SweeperError::Load`] when the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| SweeperError::load(&name, e))?;
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension without the dot; empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    /// File name with its extension stripped.
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Excel,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Target format for a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Excel => XLSX_MIME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = SweeperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(SweeperError::Config(format!(
                "Unknown export format '{other}' (expected csv or excel)"
            ))),
        }
    }
}

/// Serialized table ready to be handed to a download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// A cleaning operation that can be triggered on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleaningStep {
    RemoveDuplicates,
    FillMissing,
}

impl CleaningStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "Remove duplicates",
            Self::FillMissing => "Fill missing values",
        }
    }
}

/// Per-file cleaning flags for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningState {
    pub enabled: bool,
    pub duplicates_removed: bool,
    pub missing_filled: bool,
}

/// Options that affect how an upload is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows scanned when inferring CSV column types.
    pub infer_schema_length: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 10_000,
        }
    }
}

/// Size and shape of a loaded upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub name: String,
    pub size_bytes: u64,
    pub rows: usize,
    pub columns: usize,
}

impl FileMetadata {
    pub fn new(file: &UploadedFile, table: &DataFrame) -> Self {
        Self {
            name: file.name().to_owned(),
            size_bytes: file.size(),
            rows: table.height(),
            columns: table.width(),
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Size: {:.2} KB | Rows & Columns: {} rows × {} columns",
            self.size_kb(),
            self.rows,
            self.columns
        )
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Descriptive statistics for every numeric column of a table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStats {
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The latest control values for one file.
///
/// Each change of a control is a fresh request; the session recomputes
/// everything downstream of its stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    /// Cleaning steps only run when this is set.
    pub cleaning_enabled: bool,
    /// Cleaning steps to trigger, applied in this order.
    pub steps: Vec<CleaningStep>,
    /// Ordered column selection; `None` keeps every column.
    pub columns: Option<Vec<String>>,
    pub show_preview: bool,
    pub preview_rows: usize,
    pub show_summary: bool,
    pub show_chart: bool,
    pub convert_to: Option<ExportFormat>,
}

impl Default for FileRequest {
    fn default() -> Self {
        Self {
            cleaning_enabled: false,
            steps: Vec::new(),
            columns: None,
            show_preview: false,
            preview_rows: 5,
            show_summary: false,
            show_chart: false,
            convert_to: None,
        }
    }
}
