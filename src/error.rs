//! Error taxonomy for the two ETL stages.
//!
//! [`EtlError`] covers every failure a stage can observe. Whether a failure
//! stops the run is decided by [`EtlError::is_recoverable`]: classification,
//! schema and CSV parse failures are isolated to one file or chunk, while
//! row conversion, I/O and configuration failures are fatal. A fatal error is
//! reported as a [`RunError`] that names the stage it happened in.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A failure raised by one of the pipeline components.
#[derive(Debug, Error)]
pub enum EtlError {
    /// The file could not be read for content sniffing.
    #[error("cannot classify {}: {source}", path.display())]
    Classification {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A chunk lacks one or more required columns.
    #[error("chunk {chunk} of {} is missing required columns: {}", path.display(), missing.join(", "))]
    SchemaValidation {
        path: PathBuf,
        chunk: usize,
        missing: Vec<String>,
    },

    /// The file is not syntactically valid CSV.
    #[error("malformed CSV in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A price or quantity field could not be read as a number.
    #[error("{}, line {line}: {field} value {value:?} is not numeric", artifact.display())]
    NumericConversion {
        artifact: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },

    /// A date field could not be parsed.
    #[error("{}, line {line}: date value {value:?} is not a recognized date", artifact.display())]
    DateParse {
        artifact: PathBuf,
        line: u64,
        value: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the run may continue past this error.
    ///
    /// Recoverable errors are scoped to one source file or one chunk.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Classification { .. } | Self::SchemaValidation { .. } | Self::Parse { .. }
        )
    }

    /// Whether this is a per-row conversion failure from normalization.
    #[must_use]
    pub fn is_row_error(&self) -> bool {
        matches!(self, Self::NumericConversion { .. } | Self::DateParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// The phase a run is in. Failures are attributed to the stage that was
/// active when they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Scanning,
    Extraction,
    Normalization,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Scanning => "scanning",
            Stage::Extraction => "extraction",
            Stage::Normalization => "normalization",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// A fatal error that aborted a run.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: EtlError,
}

impl RunError {
    #[must_use]
    pub fn new(stage: Stage, source: EtlError) -> Self {
        Self { stage, source }
    }
}
