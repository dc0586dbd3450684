//! Salesbeam command-line entry point.
//!
//! Thin binary. All logic lives in the library crate.

use anyhow::Context;
use clap::Parser;
use salesbeam::config::PipelineConfig;
use salesbeam::logging::init_logging;
use salesbeam::{Pipeline, ValidationMode};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "salesbeam")]
#[command(about = "Extract and normalize CSV sales records from a directory of files")]
#[command(version)]
struct Cli {
    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to scan for source files
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory that receives both artifacts
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Product value rows must match to be kept
    #[arg(long)]
    target_product: Option<String>,

    /// Rows per streaming chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// What to do with rows that fail conversion: fail-fast, log-and-continue, skip-invalid
    #[arg(long)]
    row_errors: Option<ValidationMode>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Classify input files on a thread pool
    #[arg(long)]
    parallel_classify: bool,

    /// Log per-chunk detail
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(product) = self.target_product {
            config.target_product = product;
        }
        if let Some(size) = self.chunk_size {
            config.chunk_size = size;
        }
        if let Some(mode) = self.row_errors {
            config.row_errors = mode;
        }
        if let Some(report) = self.report {
            config.report_file = Some(report);
        }
        config.parallel_classify |= self.parallel_classify;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.into_config().context("load configuration")?;
    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        target = %config.target_product,
        "salesbeam starting"
    );

    Pipeline::new(config).run().inspect_err(|e| error!("{e}"))?;
    Ok(())
}
