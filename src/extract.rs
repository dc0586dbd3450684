//! Extraction/filter stage.
//!
//! Every accepted source file is streamed in chunks. A chunk is validated
//! against [`REQUIRED_COLUMNS`] as a whole; valid chunks contribute the rows
//! whose `product` equals the target value, projected to the required columns
//! in canonical order, to the shared consolidated artifact.
//!
//! A source that turns out not to be parseable CSV fails on its own: the
//! error is returned to the caller, which records it and moves on to the next
//! file.

use crate::error::{EtlError, Result};
use crate::io::csv::{ArtifactWriter, CsvChunk, open_csv_chunks};
use crate::validation::{REQUIRED_COLUMNS, column_positions, missing_columns};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What happened to one chunk of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChunkOutcome {
    /// The chunk passed schema validation; `matched` of its `rows` were kept.
    Accepted {
        chunk: usize,
        rows: usize,
        matched: usize,
    },
    /// The chunk lacked required columns and all of its rows were dropped.
    Rejected {
        chunk: usize,
        rows: usize,
        missing: Vec<String>,
    },
}

impl ChunkOutcome {
    #[must_use]
    pub fn matched(&self) -> usize {
        match self {
            ChunkOutcome::Accepted { matched, .. } => *matched,
            ChunkOutcome::Rejected { .. } => 0,
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, ChunkOutcome::Rejected { .. })
    }

    /// The schema failure this outcome stands for, if any.
    #[must_use]
    pub fn to_error(&self, path: &Path) -> Option<EtlError> {
        match self {
            ChunkOutcome::Rejected { chunk, missing, .. } => Some(EtlError::SchemaValidation {
                path: path.to_path_buf(),
                chunk: *chunk,
                missing: missing.clone(),
            }),
            ChunkOutcome::Accepted { .. } => None,
        }
    }
}

/// Per-file extraction summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub chunks: Vec<ChunkOutcome>,
    pub rows_read: usize,
    pub rows_matched: usize,
}

impl FileExtraction {
    #[must_use]
    pub fn chunks_rejected(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_rejected()).count()
    }
}

/// Filters source chunks into the consolidated artifact.
///
/// Borrowing the stage's single [`ArtifactWriter`] keeps the run-wide
/// header flag and the append order in one place.
pub struct Extractor<'w, W: Write> {
    writer: &'w mut ArtifactWriter<W>,
    target_product: String,
    chunk_size: usize,
}

impl<'w, W: Write> Extractor<'w, W> {
    pub fn new(writer: &'w mut ArtifactWriter<W>, target_product: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            writer,
            target_product: target_product.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Validate, filter, and append one chunk.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if the artifact cannot be written.
    pub fn process_chunk(&mut self, chunk: &CsvChunk) -> Result<ChunkOutcome> {
        let Some(positions) = column_positions(&chunk.headers, &REQUIRED_COLUMNS) else {
            return Ok(ChunkOutcome::Rejected {
                chunk: chunk.index,
                rows: chunk.len(),
                missing: missing_columns(&chunk.headers, &REQUIRED_COLUMNS),
            });
        };
        let product = positions[0];
        let target = self.target_product.as_str();
        let kept = chunk
            .rows
            .iter()
            .filter(|row| row.get(product) == Some(target))
            .map(|row| positions.iter().map(move |&i| row.get(i).unwrap_or("")));
        let matched = self.writer.append(kept)?;
        Ok(ChunkOutcome::Accepted {
            chunk: chunk.index,
            rows: chunk.len(),
            matched,
        })
    }

    /// Stream one source file through [`process_chunk`](Self::process_chunk).
    ///
    /// On a CSV syntax error the rows appended from earlier chunks of the file
    /// stay in the artifact; the error is returned so the caller can record it.
    ///
    /// # Errors
    /// Returns [`EtlError::Parse`] if the source cannot be opened or is
    /// malformed CSV, and [`EtlError::Io`] if the artifact cannot be written.
    pub fn extract_file(&mut self, path: &Path) -> Result<FileExtraction> {
        let mut summary = FileExtraction {
            path: path.to_path_buf(),
            ..FileExtraction::default()
        };
        // A source that cannot be opened is a per-file failure, not a fatal one.
        let chunks = open_csv_chunks(path, self.chunk_size).map_err(|e| match e {
            EtlError::Io { path, source } => EtlError::Parse {
                path,
                source: source.into(),
            },
            other => other,
        })?;
        for chunk in chunks {
            let chunk = chunk.map_err(|source| EtlError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            let outcome = self.process_chunk(&chunk)?;
            if let Some(err) = outcome.to_error(path) {
                warn!(path = %path.display(), chunk = chunk.index, rows = chunk.len(), "dropping chunk: {err}");
            } else {
                debug!(path = %path.display(), chunk = chunk.index, rows = chunk.len(), matched = outcome.matched(), "chunk accepted");
            }
            summary.rows_read += chunk.len();
            summary.rows_matched += outcome.matched();
            summary.chunks.push(outcome);
        }
        Ok(summary)
    }

    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.writer.rows_written()
    }
}
