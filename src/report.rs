//! End-of-run reporting.
//!
//! A [`RunReport`] gathers every skip and drop decision a run made: rejected
//! files, files that failed to parse, chunks dropped for missing columns, and
//! rows skipped during normalization. It can be logged as a summary or saved
//! as pretty-printed JSON.

use crate::error::{EtlError, Result};
use crate::extract::FileExtraction;
use crate::normalize::NormalizeSummary;
use crate::scan::RejectedFile;
use crate::validation::RecordError;
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A source file whose extraction stopped on a CSV syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
    /// Rows from earlier chunks of this file that were already appended.
    pub rows_appended: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub input_dir: PathBuf,
    pub consolidated_path: PathBuf,
    pub normalized_path: PathBuf,
    pub files_seen: usize,
    /// Files accepted as CSV by content, whatever their schema.
    pub csv_files: usize,
    pub rejected_files: Vec<RejectedFile>,
    pub extracted_files: Vec<FileExtraction>,
    pub failed_files: Vec<FailedFile>,
    pub rows_extracted: u64,
    pub normalization: NormalizeSummary,
    pub row_errors: Vec<RecordError>,
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Chunks dropped for missing required columns, across all files.
    #[must_use]
    pub fn chunks_rejected(&self) -> usize {
        self.extracted_files
            .iter()
            .map(FileExtraction::chunks_rejected)
            .sum()
    }

    #[must_use]
    pub fn chunks_accepted(&self) -> usize {
        self.extracted_files
            .iter()
            .map(|f| f.chunks.len() - f.chunks_rejected())
            .sum()
    }

    /// The schema failures behind every rejected chunk.
    #[must_use]
    pub fn schema_errors(&self) -> Vec<EtlError> {
        self.extracted_files
            .iter()
            .flat_map(|f| f.chunks.iter().filter_map(|c| c.to_error(&f.path)))
            .collect()
    }

    /// Export the report to JSON format.
    ///
    /// # Errors
    /// Returns the serializer's error; the report holds only plain data, so
    /// this does not fail in practice.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as JSON, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }
        let json = self
            .to_json()
            .map_err(|e| EtlError::io(path, std::io::Error::other(e)))?;
        let mut file = File::create(path).map_err(|e| EtlError::io(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| EtlError::io(path, e))?;
        Ok(())
    }

    /// Emit the end-of-run summary through `tracing`.
    pub fn log_summary(&self) {
        info!(
            files_seen = self.files_seen,
            rejected = self.rejected_files.len(),
            "Total CSV files processed: {}",
            self.csv_files
        );
        if !self.failed_files.is_empty() {
            warn!(failed = self.failed_files.len(), "some CSV files could not be parsed");
        }
        let dropped = self.chunks_rejected();
        if dropped > 0 {
            warn!(chunks = dropped, "chunks dropped for missing required columns");
        }
        info!(
            rows_extracted = self.rows_extracted,
            rows_normalized = self.normalization.rows_written,
            rows_skipped = self.normalization.rows_skipped,
            elapsed_ms = self.elapsed_ms,
            "Converted data saved to {}",
            self.normalized_path.display()
        );
    }
}
