//! Directory scanning.
//!
//! [`scan_dir`] lists the regular files of an input directory in file-name
//! order and classifies each one. Only files whose content is exactly
//! [`ContentType::Csv`] are accepted; everything else is rejected with a
//! logged notice. Directories and dangling symlinks are skipped without a
//! notice.
//!
//! Classification is side-effect free, so with the `parallel-io` feature it
//! can run on the rayon pool. Results are gathered back in scan order either
//! way.

use crate::classify::{ContentClassifier, ContentType};
use crate::error::{EtlError, Result};
#[cfg(feature = "parallel-io")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file accepted for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content_type: ContentType,
}

/// Why a file was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub path: PathBuf,
    /// `None` when the file could not be read for classification.
    pub content_type: Option<ContentType>,
    pub reason: String,
}

/// The files of one scan, split by decision, each in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub accepted: Vec<SourceFile>,
    pub rejected: Vec<RejectedFile>,
}

impl ScanResult {
    /// Number of files accepted as CSV.
    #[must_use]
    pub fn csv_count(&self) -> usize {
        self.accepted.len()
    }

    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Regular files directly inside `dir`, sorted by file name.
///
/// Symlinks are followed; entries that are not regular files after
/// following, or whose target is missing, are left out.
///
/// # Errors
/// Returns [`EtlError::Io`] if `dir` cannot be listed.
pub fn list_regular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| EtlError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EtlError::io(dir, e))?;
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            _ => {}
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Classify one file and decide whether it is accepted.
pub fn classify_file<C: ContentClassifier + ?Sized>(
    classifier: &C,
    path: PathBuf,
) -> std::result::Result<SourceFile, RejectedFile> {
    match classifier.classify(&path) {
        Ok(content_type) if content_type.is_csv() => Ok(SourceFile { path, content_type }),
        Ok(content_type) => Err(RejectedFile {
            reason: format!("content is {content_type}, not text/csv"),
            path,
            content_type: Some(content_type),
        }),
        Err(err) => Err(RejectedFile {
            reason: err.to_string(),
            path,
            content_type: None,
        }),
    }
}

/// Scan `dir`, classifying every regular file.
///
/// With `parallel` set (and the `parallel-io` feature enabled) files are
/// classified concurrently.
///
/// # Errors
/// Returns [`EtlError::Io`] if `dir` cannot be listed. Per-file
/// classification failures are rejections, not errors.
pub fn scan_dir<C: ContentClassifier + ?Sized>(
    dir: &Path,
    classifier: &C,
    parallel: bool,
) -> Result<ScanResult> {
    let files = list_regular_files(dir)?;
    if files.is_empty() {
        info!(dir = %dir.display(), "no files found in the input directory");
    }

    let decisions = classify_all(classifier, files, parallel);

    let mut result = ScanResult::default();
    for decision in decisions {
        match decision {
            Ok(source) => {
                info!(path = %source.path.display(), "accepted CSV file");
                result.accepted.push(source);
            }
            Err(rejected) => {
                warn!(path = %rejected.path.display(), "skipping file, not a CSV file: {}", rejected.reason);
                result.rejected.push(rejected);
            }
        }
    }
    Ok(result)
}

#[cfg(feature = "parallel-io")]
fn classify_all<C: ContentClassifier + ?Sized>(
    classifier: &C,
    files: Vec<PathBuf>,
    parallel: bool,
) -> Vec<std::result::Result<SourceFile, RejectedFile>> {
    if parallel {
        files
            .par_iter()
            .map(|path| classify_file(classifier, path.clone()))
            .collect()
    } else {
        files.into_iter().map(|path| classify_file(classifier, path)).collect()
    }
}

#[cfg(not(feature = "parallel-io"))]
fn classify_all<C: ContentClassifier + ?Sized>(
    classifier: &C,
    files: Vec<PathBuf>,
    _parallel: bool,
) -> Vec<std::result::Result<SourceFile, RejectedFile>> {
    files.into_iter().map(|path| classify_file(classifier, path)).collect()
}
