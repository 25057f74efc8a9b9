//! # Data Sweeper
//!
//! Load CSV and Excel files, look at them, tidy them up and convert them.
//!
//! Every uploaded file runs through the same short pipeline, independently of
//! the others:
//!
//! ```text
//! UploadedFile ──load──> DataFrame ──normalize──> metadata / preview / summary
//!                                       │
//!                                       ├─ remove_duplicates   (opt-in)
//!                                       ├─ fill_missing_numeric (opt-in)
//!                                       │
//!                                       └─ select_columns ──> chart
//!                                                         └──> export (CSV | Excel)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use data_sweeper::sweeper::{self, ExportFormat, LoadOptions, UploadedFile};
//!
//! let file = UploadedFile::from_path("sales.xlsx".as_ref())?;
//! let table = sweeper::load(&file, &LoadOptions::default())?;
//!
//! let (deduped, removed) = sweeper::remove_duplicates(&table)?;
//! println!("Removed {removed} duplicate rows");
//!
//! let artifact = sweeper::export(&deduped, ExportFormat::Csv, file.name())?;
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`sweeper`]: the per-file pipeline, sessions and batch runner
//! - [`config`]: JSON settings (preview size, cleaning order, output dir)
//! - [`error`]: error types; per-file failures never stop a batch
//! - [`logging`]: `tracing` setup

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod logging;
pub mod sweeper;
