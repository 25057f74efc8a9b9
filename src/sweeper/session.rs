//! Per-file session state and the sequential batch runner.

use super::chart::{BarChart, numeric_chart};
use super::cleaning::{self, StepOutcome};
use super::io::{export, load};
use super::projection::{column_names, preview, select_columns};
use super::summary::compute_summary;
use super::types::{
    CleaningState, ExportArtifact, FileMetadata, FileRequest, LoadOptions, SummaryStats,
    UploadedFile,
};
use crate::error::{Result, SweeperError};
use polars::prelude::DataFrame;
use std::fmt;

/// What the visualization control produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Chart(BarChart),
    NoNumericColumns,
}

/// Everything one request/response cycle produced for a file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub metadata: FileMetadata,
    pub preview: Option<DataFrame>,
    pub summary: Option<SummaryStats>,
    pub cleaning: Vec<StepOutcome>,
    pub selected_columns: Vec<String>,
    /// Row count of the projected table (kept even when no column is selected).
    pub row_count: usize,
    pub table: DataFrame,
    pub chart: Option<ChartView>,
    pub artifact: Option<ExportArtifact>,
}

impl FileReport {
    /// Rows dropped by duplicate removal during this request, if it ran.
    pub fn duplicates_removed(&self) -> Option<usize> {
        self.cleaning.iter().rev().find_map(|o| match o {
            StepOutcome::DuplicatesRemoved(n) => Some(*n),
            StepOutcome::MissingFilled { .. } => None,
        })
    }

    pub fn missing_filled(&self) -> bool {
        self.cleaning
            .iter()
            .any(|o| matches!(o, StepOutcome::MissingFilled { .. }))
    }
}

/// Session state for one uploaded file.
///
/// Holds the loaded table for the lifetime of the session. Cleaning steps
/// replace the stored table; projection, charting and export work on copies.
#[derive(Debug, Clone)]
pub struct FileSession {
    file: UploadedFile,
    table: DataFrame,
    cleaning: CleaningState,
}

impl FileSession {
    /// Load an upload and start its session.
    ///
    /// # Errors
    ///
    /// [`SweeperError::Load`] when the upload cannot be parsed.
    pub fn open(file: UploadedFile, options: &LoadOptions) -> Result<Self> {
        let table = load(&file, options)?;
        Ok(Self {
            file,
            table,
            cleaning: CleaningState::default(),
        })
    }

    pub fn file(&self) -> &UploadedFile {
        &self.file
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn cleaning_state(&self) -> CleaningState {
        self.cleaning
    }

    pub fn metadata(&self) -> FileMetadata {
        FileMetadata::new(&self.file, &self.table)
    }

    /// Run one request against the stored table.
    ///
    /// Order: metadata, preview and summary of the table as stored, then the
    /// requested cleaning steps (only when cleaning is enabled), then column
    /// projection, chart and export of the projected table.
    ///
    /// # Errors
    ///
    /// A per-file [`SweeperError`]: `Processing` when summary, cleaning or
    /// charting fails, `UnknownColumn`/`DuplicateColumn` for a bad selection,
    /// `Export` when the conversion fails. Cleaning already applied stays applied.
    pub fn run(&mut self, request: &FileRequest) -> Result<FileReport> {
        let name = self.file.name().to_owned();
        let metadata = self.metadata();

        let preview = request
            .show_preview
            .then(|| preview(&self.table, request.preview_rows));

        let summary = if request.show_summary {
            Some(compute_summary(&self.table).map_err(|e| per_file(&name, &e))?)
        } else {
            None
        };

        self.cleaning.enabled = request.cleaning_enabled;
        let mut cleaning_outcomes = Vec::new();
        if request.cleaning_enabled && !request.steps.is_empty() {
            let (table, outcomes) = cleaning::apply_steps(self.table.clone(), &request.steps)
                .map_err(|e| per_file(&name, &e))?;
            self.table = table;
            for outcome in &outcomes {
                match outcome {
                    StepOutcome::DuplicatesRemoved(_) => self.cleaning.duplicates_removed = true,
                    StepOutcome::MissingFilled { .. } => self.cleaning.missing_filled = true,
                }
            }
            cleaning_outcomes = outcomes;
        }

        let selected_columns = match &request.columns {
            Some(columns) => columns.clone(),
            None => column_names(&self.table),
        };
        let table = select_columns(&self.table, &selected_columns, &name)?;
        let row_count = self.table.height();

        let chart = if request.show_chart {
            Some(
                match numeric_chart(&table).map_err(|e| per_file(&name, &e))? {
                    Some(chart) => ChartView::Chart(chart),
                    None => {
                        tracing::warn!(file = %name, "No numeric columns available for visualization");
                        ChartView::NoNumericColumns
                    }
                },
            )
        } else {
            None
        };

        let artifact = match request.convert_to {
            Some(format) => Some(export(&table, format, &name)?),
            None => None,
        };

        Ok(FileReport {
            metadata,
            preview,
            summary,
            cleaning: cleaning_outcomes,
            selected_columns,
            row_count,
            table,
            chart,
            artifact,
        })
    }
}

fn per_file(name: &str, err: &anyhow::Error) -> SweeperError {
    SweeperError::Processing {
        file: name.to_owned(),
        reason: format!("{err:#}"),
    }
}

/// Result of one file's pipeline run within a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: Result<FileReport>,
}

/// Load and run each upload in order. A failure only ends that file's run;
/// the next file is still processed.
pub fn process_uploads(
    files: Vec<UploadedFile>,
    options: &LoadOptions,
    request: &FileRequest,
) -> Vec<FileOutcome> {
    files
        .into_iter()
        .map(|file| {
            let file_name = file.name().to_owned();
            let _span = tracing::info_span!("file", name = %file_name).entered();

            let result = FileSession::open(file, options).and_then(|mut s| s.run(request));
            match &result {
                Ok(report) => tracing::info!(
                    rows = report.row_count,
                    columns = report.selected_columns.len(),
                    "Processed file"
                ),
                Err(e) => tracing::error!("{e}"),
            }
            FileOutcome { file_name, result }
        })
        .collect()
}

/// Counts for the end-of-batch status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        Self {
            succeeded: outcomes.len() - failed,
            failed,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed == 0 {
            write!(f, "All {} files processed successfully!", self.succeeded)
        } else {
            write!(
                f,
                "Processed {} files: {} succeeded, {} failed.",
                self.succeeded + self.failed,
                self.succeeded,
                self.failed
            )
        }
    }
}
