//! The per-file transform pipeline: load, clean, project, chart and export.
//!
//! Each uploaded file gets its own [`FileSession`]; nothing is shared between
//! files. A session runs one [`FileRequest`] at a time against its stored
//! table, so changing a control means building a new request and running it
//! again.
//!
//! # Steps
//!
//! 1. **Load**: `.csv` through the Polars CSV reader, `.xlsx` through
//!    `calamine`; anything else is a [`SweeperError::Load`].
//! 2. **Normalize**: columns that are not numeric, boolean, string or temporal
//!    become strings.
//! 3. **Report**: size and shape ([`FileMetadata`]), preview, summary.
//! 4. **Clean** (opt-in): [`remove_duplicates`] and [`fill_missing_numeric`],
//!    in the order the request lists them.
//! 5. **Project**: [`select_columns`].
//! 6. **Chart**: [`numeric_chart`].
//! 7. **Export**: [`export`] to CSV or Excel.
//!
//! # Example
//!
//! ```no_run
//! use data_sweeper::sweeper::{
//!     CleaningStep, ExportFormat, FileRequest, FileSession, LoadOptions, UploadedFile,
//! };
//!
//! let file = UploadedFile::new("scores.csv", b"a,b\n1,\n2,5\n1,5\n".to_vec());
//! let mut session = FileSession::open(file, &LoadOptions::default())?;
//!
//! let report = session.run(&FileRequest {
//!     cleaning_enabled: true,
//!     steps: vec![CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
//!     convert_to: Some(ExportFormat::Csv),
//!     ..Default::default()
//! })?;
//!
//! let artifact = report.artifact.expect("conversion requested");
//! assert_eq!(artifact.file_name, "scores.csv");
//! # Ok::<(), data_sweeper::error::SweeperError>(())
//! ```
//!
//! [`SweeperError::Load`]: crate::error::SweeperError::Load

pub mod chart;
pub mod cleaning;
pub mod excel;
pub mod io;
pub mod projection;
pub mod session;
pub mod summary;
pub mod types;

pub use chart::{BarChart, ChartSeries, numeric_chart, render_text};
pub use cleaning::{StepOutcome, apply_steps, fill_missing_numeric, remove_duplicates};
pub use io::{export, export_file_name, load, normalize_types};
pub use projection::{column_names, preview, select_columns};
pub use session::{
    BatchSummary, ChartView, FileOutcome, FileReport, FileSession, process_uploads,
};
pub use summary::{compute_summary, render_summary};
pub use types::{
    CSV_MIME, CleaningState, CleaningStep, ColumnSummary, ExportArtifact, ExportFormat,
    FileMetadata, FileRequest, LoadOptions, SourceFormat, SummaryStats, UploadedFile, XLSX_MIME,
};
