//! Testing utilities for salesbeam runs.
//!
//! This module provides the building blocks the crate's own tests use and
//! that downstream users can reuse:
//!
//! - **Fixtures**: sales records and CSV text in the shape the pipeline reads
//! - **Mock I/O**: temporary input/output directories with file helpers
//! - **Test doubles**: [`FixedClassifier`], a classifier decided by file name
//! - **Assertions**: artifact checks such as "the header appears once"
//!
//! # Quick Start
//!
//! ```no_run
//! use salesbeam::testing::*;
//! use salesbeam::{Pipeline, PipelineConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = TempDirPath::new()?;
//! let output = TempDirPath::new()?;
//! input.write_sales("sales.csv", &sample_sales())?;
//!
//! let config = PipelineConfig::with_dirs(input.path(), output.path());
//! let report = Pipeline::new(config.clone()).run()?;
//! assert_eq!(report.csv_files, 1);
//! assert_header_once(&config.consolidated_path(), "product,price,quantity,date,region");
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod doubles;
pub mod fixtures;
pub mod mock_io;

// Re-export commonly used items
pub use assertions::*;
pub use doubles::*;
pub use fixtures::*;
pub use mock_io::*;
