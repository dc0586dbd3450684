//! # Salesbeam
//!
//! A **streaming two-stage ETL** that pulls CSV sales records out of a
//! directory of arbitrary files and reshapes them for reporting.
//!
//! ## Key Features
//!
//! - **Content-based file detection** - CSV files are recognized by what they
//!   contain, so a misnamed CSV is accepted and a `.csv` full of prose is not
//! - **Bounded memory** - both stages stream their input in fixed-size chunks
//! - **Schema gatekeeping** - chunks missing a required column are dropped and
//!   reported, never half-processed
//! - **Exactly-once headers** - every artifact carries one header no matter how
//!   many files or chunks feed it
//! - **Configurable row policy** - fail fast, log and continue, or skip silently
//!   when a price or date cannot be converted
//! - **Structured run report** - every skip and drop decision, exportable as JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use salesbeam::{Pipeline, PipelineConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = PipelineConfig::with_dirs("./data", "./output");
//! let report = Pipeline::new(config).run()?;
//! println!("{} CSV files processed", report.csv_files);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! ### Extraction
//! The [`scan`] module lists the input directory and asks a
//! [`ContentClassifier`] about every regular file. Accepted files are streamed
//! through [`extract::Extractor`], which validates each chunk against
//! [`validation::REQUIRED_COLUMNS`], keeps the rows of the target product, and
//! appends them to the consolidated artifact.
//!
//! ### Normalization
//! Once extraction has finished, [`normalize::Normalizer`] streams the
//! consolidated artifact, converts `price` and `quantity` into `Sales`, parses
//! `date`, and writes `Sales,Date,Region` to the normalized artifact.
//!
//! ## Module Overview
//!
//! - [`classify`] - Content sniffing behind the [`ContentClassifier`] trait
//! - [`scan`] - Directory listing and accept/reject decisions
//! - [`io`] - Chunked CSV reader and exactly-once-header artifact writer
//! - [`extract`] - Schema validation and product filtering
//! - [`normalize`] - Field conversion and reshaping
//! - [`pipeline`] - The run state machine tying the stages together
//! - [`report`] - End-of-run summary
//! - [`config`], [`error`], [`validation`], [`logging`] - Supporting pieces
//! - [`testing`] - Fixtures and test doubles

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod testing;
pub mod validation;

// General re-exports
pub use classify::{ContentClassifier, ContentType, SniffingClassifier};
pub use config::PipelineConfig;
pub use error::{EtlError, RunError, Stage};
pub use extract::{ChunkOutcome, Extractor, FileExtraction};
pub use io::csv::{ArtifactWriter, CsvChunk, CsvChunks, open_csv_chunks};
pub use normalize::{NormalizedRow, Normalizer};
pub use pipeline::{Pipeline, RunPhase, run};
pub use report::RunReport;
pub use scan::{ScanResult, SourceFile, scan_dir};
pub use validation::{ErrorCollector, ValidationMode};
