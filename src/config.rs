//! Settings for a sweeping session.
//!
//! Settings are read from a JSON file passed with `--config` (or the
//! `DATA_SWEEPER_CONFIG` environment variable). Missing keys fall back to
//! their defaults; nothing is ever written back.
//!
//! ```json
//! {
//!   "preview_rows": 10,
//!   "cleaning_order": ["FillMissing", "RemoveDuplicates"],
//!   "default_format": "Excel",
//!   "output_dir": "converted"
//! }
//! ```

use crate::error::{Result, SweeperError};
use crate::sweeper::{CleaningStep, ExportFormat, FileRequest, LoadOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "DATA_SWEEPER_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SweeperConfig {
    /// Rows shown by the preview (default: 5)
    pub preview_rows: usize,
    /// Rows scanned to infer CSV column types (default: 10000)
    pub infer_schema_length: usize,
    /// Order cleaning steps run in when several are triggered together
    pub cleaning_order: Vec<CleaningStep>,
    /// Conversion target when none is given on the command line
    pub default_format: ExportFormat,
    /// Where converted files are written
    pub output_dir: PathBuf,
    /// Width in characters of the longest bar in text charts
    pub chart_width: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            infer_schema_length: 10_000,
            cleaning_order: vec![CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
            default_format: ExportFormat::Csv,
            output_dir: PathBuf::from("."),
            chart_width: 40,
        }
    }
}

impl SweeperConfig {
    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// [`SweeperError::Config`] when the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SweeperError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate settings from a JSON string.
    ///
    /// # Errors
    ///
    /// [`SweeperError::Config`] for malformed JSON or settings that fail [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings from `path` when given, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_file`]; never fails without a path.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                tracing::info!("Loading config from {}", p.display());
                Self::from_file(p)
            }
            None => Ok(Self::default()),
        }
    }

    /// # Errors
    ///
    /// [`SweeperError::Config`] when a count is zero or `cleaning_order`
    /// repeats a step.
    pub fn validate(&self) -> Result<()> {
        if self.preview_rows == 0 {
            return Err(SweeperError::Config(
                "preview_rows must be at least 1".to_owned(),
            ));
        }
        if self.infer_schema_length == 0 {
            return Err(SweeperError::Config(
                "infer_schema_length must be at least 1".to_owned(),
            ));
        }
        if self.chart_width == 0 {
            return Err(SweeperError::Config(
                "chart_width must be at least 1".to_owned(),
            ));
        }
        let mut seen = HashSet::new();
        for step in &self.cleaning_order {
            if !seen.insert(step) {
                return Err(SweeperError::Config(format!(
                    "cleaning_order lists '{}' more than once",
                    step.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            infer_schema_length: self.infer_schema_length,
        }
    }

    /// Order the triggered steps by `cleaning_order`; triggered steps missing
    /// from it run last, in declaration order.
    pub fn order_steps(&self, triggered: &[CleaningStep]) -> Vec<CleaningStep> {
        let mut steps: Vec<CleaningStep> = self
            .cleaning_order
            .iter()
            .filter(|s| triggered.contains(s))
            .copied()
            .collect();
        for step in triggered {
            if !steps.contains(step) {
                steps.push(*step);
            }
        }
        steps
    }

    /// A request carrying these settings' preview size and nothing else.
    pub fn base_request(&self) -> FileRequest {
        FileRequest {
            preview_rows: self.preview_rows,
            ..FileRequest::default()
        }
    }
}
