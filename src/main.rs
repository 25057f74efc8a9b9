//! # Data Sweeper command-line entry point
//!
//! ```bash
//! data-sweeper inspect sales.csv
//! data-sweeper process sales.csv stock.xlsx --clean --dedupe --fill-missing --to excel
//! ```
//!
//! Per-file failures are reported and skipped; the process only exits non-zero
//! when the command itself cannot run (for example an invalid config file).

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // command output goes to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    if let Err(e) = data_sweeper::logging::init() {
        data_sweeper::logging::init_stderr_only()?;
        tracing::warn!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    cli::run(cli)
}
