//! Centralized error handling for data-sweeper.
//!
//! Every failure the file pipeline can report is a [`SweeperError`]. The
//! variants that carry a `file` field are *per-file* errors: the batch runner
//! records them against that file and moves on to the next upload.
//!
//! ```
//! use data_sweeper::error::SweeperError;
//!
//! let err = SweeperError::load("data.txt", "unsupported file extension 'txt'");
//! assert!(err.to_string().contains("data.txt"));
//! assert!(err.is_per_file());
//! ```
//!
//! Internal steps return `anyhow::Result`; their errors are flattened into the
//! `reason` of a per-file variant once the file name is known.

use thiserror::Error;

/// Main error type for data-sweeper operations.
#[derive(Debug, Error)]
pub enum SweeperError {
    /// The uploaded file could not be parsed into a table.
    #[error("Error loading {file}: {reason}")]
    Load { file: String, reason: String },

    /// The table could not be serialized to the requested format.
    #[error("Error exporting {file}: {reason}")]
    Export { file: String, reason: String },

    /// A summary, cleaning or charting step failed on a loaded table.
    #[error("Error processing {file}: {reason}")]
    Processing { file: String, reason: String },

    /// A column selection named a column the table does not have.
    #[error("Column '{column}' not found in {file}")]
    UnknownColumn { file: String, column: String },

    /// A column selection named the same column twice.
    #[error("Column '{column}' selected more than once for {file}")]
    DuplicateColumn { file: String, column: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SweeperError {
    pub fn load(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::Load {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub fn export(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::Export {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error only aborts the current file's pipeline run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::Export { .. }
                | Self::Processing { .. }
                | Self::UnknownColumn { .. }
                | Self::DuplicateColumn { .. }
        )
    }

    /// Name of the file this error is about, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Load { file, .. }
            | Self::Export { file, .. }
            | Self::Processing { file, .. }
            | Self::UnknownColumn { file, .. }
            | Self::DuplicateColumn { file, .. } => Some(file),
            Self::Config(_) => None,
        }
    }
}

impl From<serde_json::Error> for SweeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for data-sweeper operations.
pub type Result<T> = std::result::Result<T, SweeperError>;
