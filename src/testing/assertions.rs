//! Assertion functions for checking pipeline artifacts.

use crate::testing::mock_io::{read_csv_rows, read_lines};
use std::path::Path;

/// Assert that `header` is the first line of the artifact and appears
/// nowhere else in it.
///
/// # Panics
///
/// Panics if the file cannot be read, is empty, or repeats its header.
pub fn assert_header_once(path: &Path, header: &str) {
    let lines = read_lines(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    assert_eq!(
        lines.first().map(String::as_str),
        Some(header),
        "{} does not start with the header {header:?}",
        path.display()
    );
    let count = lines.iter().filter(|l| l.as_str() == header).count();
    assert_eq!(count, 1, "header {header:?} appears {count} times in {}", path.display());
}

/// Assert that the artifact exists and has no content at all.
///
/// # Panics
///
/// Panics if the file cannot be read or is not empty.
pub fn assert_empty_artifact(path: &Path) {
    let meta = std::fs::metadata(path).unwrap_or_else(|e| panic!("stat {}: {e}", path.display()));
    assert_eq!(meta.len(), 0, "{} should be empty", path.display());
}

/// Assert that `actual` is within `tolerance` of `expected`.
///
/// # Panics
///
/// Panics if the difference exceeds `tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

/// The data rows of a CSV artifact, header excluded.
///
/// # Panics
///
/// Panics if the file cannot be read as CSV.
#[must_use]
pub fn artifact_rows(path: &Path) -> Vec<Vec<String>> {
    read_csv_rows(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
        .1
}
