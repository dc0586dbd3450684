//! Run configuration.
//!
//! [`PipelineConfig`] holds every knob of a run. It deserializes from TOML
//! with all keys optional, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use salesbeam::config::PipelineConfig;
//!
//! let cfg = PipelineConfig::from_toml_str(r#"
//!     input_dir = "incoming"
//!     chunk_size = 250
//!     row_errors = "log-and-continue"
//! "#)?;
//! assert_eq!(cfg.chunk_size, 250);
//! assert_eq!(cfg.target_product, "pink morsel");
//! # Ok::<(), salesbeam::EtlError>(())
//! ```

use crate::error::{EtlError, Result};
use crate::validation::ValidationMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "./data";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_TARGET_PRODUCT: &str = "pink morsel";
/// Rows per streaming chunk in both stages.
pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_CONSOLIDATED_FILE: &str = "converted/result.csv";
pub const DEFAULT_NORMALIZED_FILE: &str = "converted/converted.csv";
/// Bytes read from the head of each file for content sniffing.
pub const DEFAULT_SNIFF_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory scanned for source files.
    pub input_dir: PathBuf,
    /// Directory that receives both artifacts.
    pub output_dir: PathBuf,
    /// Rows whose `product` equals this value survive extraction.
    pub target_product: String,
    pub chunk_size: usize,
    /// Policy for rows that fail normalization.
    pub row_errors: ValidationMode,
    /// Consolidated artifact, relative to `output_dir`.
    pub consolidated_file: PathBuf,
    /// Normalized artifact, relative to `output_dir`.
    pub normalized_file: PathBuf,
    /// Where to write the JSON run report, if anywhere.
    pub report_file: Option<PathBuf>,
    pub parallel_classify: bool,
    pub sniff_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            target_product: DEFAULT_TARGET_PRODUCT.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            row_errors: ValidationMode::default(),
            consolidated_file: PathBuf::from(DEFAULT_CONSOLIDATED_FILE),
            normalized_file: PathBuf::from(DEFAULT_NORMALIZED_FILE),
            report_file: None,
            parallel_classify: false,
            sniff_bytes: DEFAULT_SNIFF_BYTES,
        }
    }
}

impl PipelineConfig {
    /// Defaults with the given input and output directories.
    #[must_use]
    pub fn with_dirs(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`EtlError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EtlError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    ///
    /// # Errors
    /// Returns [`EtlError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EtlError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| EtlError::Config(format!("{}: {e}", path.display())))
    }

    #[must_use]
    pub fn consolidated_path(&self) -> PathBuf {
        self.output_dir.join(&self.consolidated_file)
    }

    #[must_use]
    pub fn normalized_path(&self) -> PathBuf {
        self.output_dir.join(&self.normalized_file)
    }

    /// The report path, resolved against `output_dir` when relative.
    #[must_use]
    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_file.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.output_dir.join(p)
            }
        })
    }

    /// Check the invariants a run depends on.
    ///
    /// # Errors
    /// Returns [`EtlError::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(EtlError::Config("chunk_size must be at least 1".into()));
        }
        if self.sniff_bytes == 0 {
            return Err(EtlError::Config("sniff_bytes must be at least 1".into()));
        }
        if self.target_product.is_empty() {
            return Err(EtlError::Config("target_product must not be empty".into()));
        }
        if self.consolidated_path() == self.normalized_path() {
            return Err(EtlError::Config(
                "consolidated_file and normalized_file must differ".into(),
            ));
        }
        // Anything written at the top of input_dir would be scanned by the next run.
        let outputs = [
            ("consolidated_file", Some(self.consolidated_path())),
            ("normalized_file", Some(self.normalized_path())),
            ("report_file", self.report_path()),
        ];
        for (key, path) in outputs {
            if let Some(path) = path
                && path.parent().is_some_and(|dir| same_dir(dir, &self.input_dir))
            {
                return Err(EtlError::Config(format!(
                    "{key} {} must not be written directly into input_dir",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Whether `a` and `b` name the same directory. Compares resolved paths when
/// both exist, the paths as written otherwise.
fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
