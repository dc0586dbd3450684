//! Deterministic stand-ins for pipeline seams.

use crate::classify::{ContentClassifier, ContentType};
use crate::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;

/// A classifier that answers by file name and never reads the file.
///
/// Useful for simulating misnamed, corrupt, or unreadable files.
///
/// # Example
///
/// ```
/// use salesbeam::classify::{ContentClassifier, ContentType};
/// use salesbeam::testing::FixedClassifier;
/// use std::path::Path;
///
/// let classifier = FixedClassifier::new(ContentType::PlainText)
///     .with("report.txt", ContentType::Csv)
///     .failing("locked.csv");
///
/// assert_eq!(classifier.classify(Path::new("/in/report.txt")).unwrap(), ContentType::Csv);
/// assert_eq!(classifier.classify(Path::new("/in/other.csv")).unwrap(), ContentType::PlainText);
/// assert!(classifier.classify(Path::new("/in/locked.csv")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    default: ContentType,
    by_name: HashMap<String, ContentType>,
    failing: HashSet<String>,
}

impl FixedClassifier {
    /// Answer `default` for every file not named explicitly.
    #[must_use]
    pub fn new(default: ContentType) -> Self {
        Self {
            default,
            by_name: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, file_name: impl Into<String>, content_type: ContentType) -> Self {
        self.by_name.insert(file_name.into(), content_type);
        self
    }

    /// Make classification of `file_name` fail as if it were unreadable.
    #[must_use]
    pub fn failing(mut self, file_name: impl Into<String>) -> Self {
        self.failing.insert(file_name.into());
        self
    }
}

impl ContentClassifier for FixedClassifier {
    fn classify_bytes(&self, _sample: &[u8], _complete: bool) -> ContentType {
        self.default
    }

    fn classify(&self, path: &Path) -> Result<ContentType> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(EtlError::Classification {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "simulated read failure"),
            });
        }
        Ok(self.by_name.get(&name).copied().unwrap_or(self.default))
    }
}
