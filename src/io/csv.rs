//! Chunked CSV reading and exactly-once-header artifact writing.
//!
//! This module provides:
//! - **Streaming ingestion** in bounded chunks: [`CsvChunks`], [`open_csv_chunks`]
//! - **Artifact output** with one header per run: [`ArtifactWriter`]
//!
//! # Design notes
//! - Chunking is **row-count based** (header excluded). Only one chunk is held
//!   in memory at a time, whatever the size of the source.
//! - Every chunk carries the header of its source so validation can run per
//!   chunk without reaching back into the reader.
//! - The writer truncates its file when created and writes the header lazily,
//!   on the first append that has rows. An artifact that never receives a row
//!   stays empty.

use crate::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{File, create_dir_all};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// A bounded batch of rows read from one CSV source.
#[derive(Debug, Clone)]
pub struct CsvChunk {
    /// 0-based position of this chunk within its source.
    pub index: usize,
    /// The source's header row.
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvChunk {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Iterator over the chunks of a CSV source.
///
/// Yields `Err` at most once: after a read error the iterator is exhausted.
/// Rows whose field count differs from the header are read errors.
pub struct CsvChunks<R: Read> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    chunk_size: usize,
    next_index: usize,
    done: bool,
}

impl<R: Read> CsvChunks<R> {
    /// Wrap `source`, reading its header row immediately.
    ///
    /// `chunk_size` is clamped to at least one row.
    ///
    /// # Errors
    /// Returns the underlying `csv::Error` if the header cannot be read.
    pub fn from_reader(source: R, chunk_size: usize) -> std::result::Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(source);
        let headers = reader.headers()?.clone();
        Ok(Self {
            reader,
            headers,
            chunk_size: chunk_size.max(1),
            next_index: 0,
            done: false,
        })
    }

    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvChunks<R> {
    type Item = std::result::Result<CsvChunk, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut rows = Vec::with_capacity(self.chunk_size);
        let mut record = StringRecord::new();
        while rows.len() < self.chunk_size {
            match self.reader.read_record(&mut record) {
                Ok(true) => rows.push(record.clone()),
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        if rows.is_empty() {
            return None;
        }
        let chunk = CsvChunk {
            index: self.next_index,
            headers: self.headers.clone(),
            rows,
        };
        self.next_index += 1;
        Some(Ok(chunk))
    }
}

/// Open `path` for chunked reading.
///
/// # Errors
/// Returns [`EtlError::Io`] if the file cannot be opened and
/// [`EtlError::Parse`] if its header row is not valid CSV.
pub fn open_csv_chunks(
    path: impl AsRef<Path>,
    chunk_size: usize,
) -> Result<CsvChunks<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EtlError::io(path, e))?;
    CsvChunks::from_reader(BufReader::new(file), chunk_size).map_err(|source| EtlError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Append-only CSV sink that writes its header exactly once.
///
/// One writer is constructed per stage and passed to every chunk call; the
/// header flag lives here rather than in any shared state.
pub struct ArtifactWriter<W: Write> {
    path: PathBuf,
    writer: csv::Writer<W>,
    header: StringRecord,
    header_written: bool,
    rows_written: u64,
}

impl ArtifactWriter<File> {
    /// Create (or truncate) the artifact at `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if the directories or file cannot be created.
    pub fn create<I, S>(path: impl AsRef<Path>, header: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| EtlError::io(path, e))?;
        Ok(Self::from_writer(path, file, header))
    }
}

impl<W: Write> ArtifactWriter<W> {
    /// Wrap an arbitrary sink. `path` is used for diagnostics only.
    pub fn from_writer<I, S>(path: impl Into<PathBuf>, sink: W, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header: StringRecord = header.into_iter().map(|h| h.as_ref().to_string()).collect();
        Self {
            path: path.into(),
            writer: WriterBuilder::new().has_headers(false).from_writer(sink),
            header,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Append `rows`, writing the header first if no row has been written yet.
    ///
    /// Returns the number of rows appended. An empty batch writes nothing,
    /// not even the header.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if a record cannot be written.
    pub fn append<I, R>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<[u8]>,
    {
        let mut count = 0usize;
        for row in rows {
            if !self.header_written {
                self.writer
                    .write_record(&self.header)
                    .map_err(|e| self.write_error(e))?;
                self.header_written = true;
            }
            self.writer.write_record(row).map_err(|e| self.write_error(e))?;
            count += 1;
        }
        self.rows_written += count as u64;
        Ok(count)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and release the sink, returning the number of rows written.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if buffered output cannot be flushed.
    pub fn finish(self) -> Result<u64> {
        self.into_inner().map(|(rows, _)| rows)
    }

    /// Flush and return the row count together with the underlying sink.
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if buffered output cannot be flushed.
    pub fn into_inner(self) -> Result<(u64, W)> {
        let Self {
            path,
            writer,
            rows_written,
            ..
        } = self;
        let mut sink = writer
            .into_inner()
            .map_err(|e| EtlError::io(&path, std::io::Error::new(e.error().kind(), e.error().to_string())))?;
        sink.flush().map_err(|e| EtlError::io(&path, e))?;
        Ok((rows_written, sink))
    }

    fn write_error(&self, e: csv::Error) -> EtlError {
        EtlError::io(&self.path, std::io::Error::other(e))
    }
}
