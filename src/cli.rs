use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use data_sweeper::config::SweeperConfig;
use data_sweeper::sweeper::{
    BatchSummary, ChartView, CleaningStep, ExportFormat, FileOutcome, FileReport, FileRequest,
    UploadedFile, process_uploads, render_summary, render_text,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "data-sweeper",
    about = "Preview, clean and convert CSV/Excel files"
)]
pub struct Cli {
    /// Path to a JSON settings file
    #[arg(long, global = true, env = data_sweeper::config::CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StepOrder {
    /// Remove duplicates, then fill missing values
    DedupeFirst,
    /// Fill missing values, then remove duplicates
    FillFirst,
}

impl StepOrder {
    fn steps(self) -> Vec<CleaningStep> {
        match self {
            Self::DedupeFirst => vec![CleaningStep::RemoveDuplicates, CleaningStep::FillMissing],
            Self::FillFirst => vec![CleaningStep::FillMissing, CleaningStep::RemoveDuplicates],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    Csv,
    Excel,
}

impl From<TargetFormat> for ExportFormat {
    fn from(value: TargetFormat) -> Self {
        match value {
            TargetFormat::Csv => Self::Csv,
            TargetFormat::Excel => Self::Excel,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show size, shape, a preview and summary statistics for each file
    Inspect {
        /// CSV or Excel files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Clean, project and convert each file
    Process {
        /// CSV or Excel files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Enable the cleaning steps below
        #[arg(long)]
        clean: bool,

        /// Remove duplicate rows (requires --clean)
        #[arg(long, requires = "clean")]
        dedupe: bool,

        /// Fill missing numeric values with the column mean (requires --clean)
        #[arg(long, requires = "clean")]
        fill_missing: bool,

        /// Order of the cleaning steps; defaults to the configured order
        #[arg(long, value_enum)]
        order: Option<StepOrder>,

        /// Comma-separated columns to keep, in order; defaults to all
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Print the first rows of each file
        #[arg(long)]
        preview: bool,

        /// Print summary statistics of numeric columns
        #[arg(long)]
        summary: bool,

        /// Print a bar chart of numeric columns
        #[arg(long)]
        chart: bool,

        /// Conversion target; defaults to the configured format
        #[arg(long, value_enum)]
        to: Option<TargetFormat>,

        /// Directory for converted files; defaults to the configured one
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Skip writing converted files
        #[arg(long)]
        no_convert: bool,
    },
}

/// Run a parsed command line.
///
/// # Errors
///
/// Fails on an invalid config file or when an artifact cannot be written;
/// per-file failures are printed and skipped.
pub fn run(cli: Cli) -> Result<()> {
    let config = SweeperConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { files } => {
            let request = FileRequest {
                show_preview: true,
                show_summary: true,
                ..config.base_request()
            };
            run_batch(&files, &config, &request, None)
        }
        Commands::Process {
            files,
            clean,
            dedupe,
            fill_missing,
            order,
            columns,
            preview,
            summary,
            chart,
            to,
            out_dir,
            no_convert,
        } => {
            let mut triggered = Vec::new();
            if dedupe {
                triggered.push(CleaningStep::RemoveDuplicates);
            }
            if fill_missing {
                triggered.push(CleaningStep::FillMissing);
            }
            let steps = match order {
                Some(order) => order
                    .steps()
                    .into_iter()
                    .filter(|s| triggered.contains(s))
                    .collect(),
                None => config.order_steps(&triggered),
            };

            let request = FileRequest {
                cleaning_enabled: clean,
                steps,
                columns,
                show_preview: preview,
                show_summary: summary,
                show_chart: chart,
                convert_to: (!no_convert)
                    .then(|| to.map_or(config.default_format, ExportFormat::from)),
                ..config.base_request()
            };

            let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            run_batch(&files, &config, &request, Some(&out_dir))
        }
    }
}

fn run_batch(
    paths: &[PathBuf],
    config: &SweeperConfig,
    request: &FileRequest,
    out_dir: Option<&Path>,
) -> Result<()> {
    let mut uploads = Vec::with_capacity(paths.len());
    let mut outcomes = Vec::new();
    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(file) => uploads.push(file),
            Err(e) => {
                tracing::error!("{e}");
                outcomes.push(FileOutcome {
                    file_name: path.display().to_string(),
                    result: Err(e),
                });
            }
        }
    }

    outcomes.extend(process_uploads(uploads, &config.load_options(), request));

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                print_report(report, config);
                if let (Some(dir), Some(artifact)) = (out_dir, &report.artifact) {
                    std::fs::create_dir_all(dir).with_context(|| {
                        format!("Failed to create output directory {}", dir.display())
                    })?;
                    let target = dir.join(&artifact.file_name);
                    std::fs::write(&target, &artifact.bytes)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    println!(
                        "Saved {} as {} ({}, {} bytes)",
                        outcome.file_name,
                        target.display(),
                        artifact.mime_type,
                        artifact.bytes.len()
                    );
                }
            }
            Err(e) => println!("\nError: {e}"),
        }
    }

    println!("\n{}", BatchSummary::from_outcomes(&outcomes));
    Ok(())
}

fn print_report(report: &FileReport, config: &SweeperConfig) {
    println!("\nFile: {}", report.metadata.name);
    println!("{}", report.metadata);

    if let Some(preview) = &report.preview {
        println!("\nPreview:\n{preview}");
    }
    if let Some(summary) = &report.summary {
        println!("\nSummary:\n{}", render_summary(summary));
    }
    for outcome in &report.cleaning {
        println!("{}", outcome.message());
    }
    if report.selected_columns.len() != report.metadata.columns {
        println!(
            "Selected columns: {} ({} rows)",
            report.selected_columns.join(", "),
            report.row_count
        );
    }
    match &report.chart {
        Some(ChartView::Chart(chart)) => {
            println!("\nChart:\n{}", render_text(chart, config.chart_width));
        }
        Some(ChartView::NoNumericColumns) => {
            println!("No numeric columns available for visualization.");
        }
        None => {}
    }
}
