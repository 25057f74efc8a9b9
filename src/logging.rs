//! Logging setup for data-sweeper.
//!
//! Logs go to stderr (so they never mix with command output on stdout) and to
//! a daily-rolling file in the platform data directory. Verbosity defaults to
//! `info` and can be overridden with `RUST_LOG`.
//!
//! ```no_run
//! data_sweeper::logging::init().expect("Failed to initialize logging");
//! tracing::info!("Sweeper started");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

const LOG_FILE_PREFIX: &str = "data-sweeper";

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/data-sweeper/logs`
/// - macOS: `~/Library/Application Support/data-sweeper/logs`
/// - Linux: `~/.local/share/data-sweeper/logs`
///
/// # Errors
///
/// Returns error if the platform has no data directory or it cannot be created.
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("data-sweeper").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn env_filter() -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")
}

/// Initializes stderr + rolling file logging.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create file appender")?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_appender);

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());
    Ok(())
}

/// Stderr-only logging, used when the log directory is unavailable.
///
/// # Errors
///
/// Returns error if a subscriber is already installed.
pub fn init_stderr_only() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")
}
