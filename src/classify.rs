//! Content-based file classification.
//!
//! A file's type is decided by what it contains, never by its name. The
//! [`ContentClassifier`] trait is the seam the scanner uses; [`SniffingClassifier`]
//! is the production implementation and `testing::FixedClassifier` a
//! deterministic double.
//!
//! ## Detection order
//!
//! 1. An empty sample is [`ContentType::Empty`].
//! 2. Known binary signatures (gzip, zip, pdf, ...) are matched on the leading
//!    bytes, the same way compressed inputs are recognized by magic bytes.
//! 3. NUL bytes or invalid UTF-8 mean [`ContentType::Binary`].
//! 4. Remaining text is [`ContentType::Csv`] when its first records share one
//!    field count greater than one across at least two records, and
//!    [`ContentType::PlainText`] otherwise.
//!
//! ```
//! use salesbeam::classify::{ContentClassifier, ContentType, SniffingClassifier};
//!
//! let sniffer = SniffingClassifier::default();
//! assert_eq!(sniffer.classify_bytes(b"a,b\n1,2\n", true), ContentType::Csv);
//! assert_eq!(sniffer.classify_bytes(b"just some words\n", true), ContentType::PlainText);
//! assert_eq!(sniffer.classify_bytes(b"\x1f\x8b\x08\x00", true).mime(), "application/gzip");
//! ```

use crate::config::DEFAULT_SNIFF_BYTES;
use crate::error::{EtlError, Result};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Records inspected when deciding whether text is CSV.
const CSV_LINES: usize = 10;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Leading-byte signatures of common binary formats.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x1f\x8b", "application/gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"\x28\xb5\x2f\xfd", "application/zstd"),
    (b"BZh", "application/x-bzip2"),
    (b"\xfd7zXZ\x00", "application/x-xz"),
];

/// The detected type of a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContentType {
    Csv,
    PlainText,
    Empty,
    /// A binary format recognized by its signature, carrying its MIME type.
    Signature(&'static str),
    Binary,
}

impl ContentType {
    /// MIME label in the form `file --mime-type` reports.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Csv => "text/csv",
            ContentType::PlainText => "text/plain",
            ContentType::Empty => "application/x-empty",
            ContentType::Signature(mime) => mime,
            ContentType::Binary => "application/octet-stream",
        }
    }

    #[must_use]
    pub fn is_csv(self) -> bool {
        self == ContentType::Csv
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Decides a file's content type from its bytes.
///
/// Implementors only need [`classify_bytes`](Self::classify_bytes); the
/// provided [`classify`](Self::classify) reads a bounded sample from disk.
pub trait ContentClassifier: Send + Sync {
    /// Classify a sample of a file's leading bytes.
    ///
    /// `complete` is `true` when `sample` holds the whole file, so the last
    /// line is known not to be cut short.
    fn classify_bytes(&self, sample: &[u8], complete: bool) -> ContentType;

    /// Maximum number of leading bytes [`classify`](Self::classify) reads.
    fn sample_len(&self) -> usize {
        DEFAULT_SNIFF_BYTES
    }

    /// Classify the file at `path`.
    ///
    /// # Errors
    /// Returns [`EtlError::Classification`] if the file cannot be opened or read.
    fn classify(&self, path: &Path) -> Result<ContentType> {
        let (sample, complete) = read_sample(path, self.sample_len())?;
        Ok(self.classify_bytes(&sample, complete))
    }
}

/// Reads at most `limit` bytes from the head of `path`.
///
/// Returns the bytes and whether they are the whole file.
fn read_sample(path: &Path, limit: usize) -> Result<(Vec<u8>, bool)> {
    let wrap = |source| EtlError::Classification {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    let mut sample = Vec::with_capacity(limit.min(8 * 1024) + 1);
    // One byte past the limit tells a file of exactly `limit` bytes apart
    // from a longer one.
    file.take(limit as u64 + 1)
        .read_to_end(&mut sample)
        .map_err(wrap)?;
    let complete = sample.len() <= limit;
    sample.truncate(limit);
    Ok((sample, complete))
}

/// Content sniffer modelled on libmagic's text and CSV heuristics.
#[derive(Debug, Clone)]
pub struct SniffingClassifier {
    sample_len: usize,
}

impl SniffingClassifier {
    #[must_use]
    pub fn new(sample_len: usize) -> Self {
        Self {
            sample_len: sample_len.max(1),
        }
    }
}

impl Default for SniffingClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SNIFF_BYTES)
    }
}

impl ContentClassifier for SniffingClassifier {
    fn classify_bytes(&self, sample: &[u8], complete: bool) -> ContentType {
        if sample.is_empty() {
            return ContentType::Empty;
        }
        if let Some(mime) = detect_signature(sample) {
            return ContentType::Signature(mime);
        }
        let Some(text) = as_text(sample, complete) else {
            return ContentType::Binary;
        };
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let text = if complete {
            text
        } else {
            // drop the partial last line
            match text.rfind('\n') {
                Some(end) => &text[..=end],
                None => text,
            }
        };
        if looks_like_csv(text) {
            ContentType::Csv
        } else {
            ContentType::PlainText
        }
    }

    fn sample_len(&self) -> usize {
        self.sample_len
    }
}

fn detect_signature(sample: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| sample.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// The sample as text, or `None` if it is binary.
///
/// A multi-byte sequence cut off by the end of an incomplete sample is not
/// evidence of binary content and is trimmed.
fn as_text(sample: &[u8], complete: bool) -> Option<&str> {
    let body = sample.strip_prefix(UTF8_BOM).unwrap_or(sample);
    if body.contains(&0) {
        return None;
    }
    match std::str::from_utf8(sample) {
        Ok(text) => Some(text),
        Err(e) if !complete && e.error_len().is_none() => {
            std::str::from_utf8(&sample[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}

fn looks_like_csv(text: &str) -> bool {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut width = None;
    let mut records = 0usize;
    for record in reader.records().take(CSV_LINES) {
        let Ok(record) = record else {
            return false;
        };
        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => return false,
            Some(_) => {}
        }
        records += 1;
    }
    records >= 2 && width.is_some_and(|w| w > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_sample_ignores_partial_last_line() {
        let sniffer = SniffingClassifier::default();
        let sample = b"a,b,c\n1,2,3\n4,5,6\n7,8";
        assert_eq!(sniffer.classify_bytes(sample, false), ContentType::Csv);
        assert_eq!(sniffer.classify_bytes(sample, true), ContentType::PlainText);
    }

    #[test]
    fn split_utf8_sequence_at_sample_end_is_still_text() {
        let sniffer = SniffingClassifier::default();
        let mut sample = "city,name\n1,Zürich\n2,Genève\n".as_bytes().to_vec();
        sample.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(sniffer.classify_bytes(&sample, false), ContentType::Csv);
        assert_eq!(sniffer.classify_bytes(&sample, true), ContentType::Binary);
    }
}
