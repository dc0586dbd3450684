//! Temporary directories for testing runs without touching real data.

use crate::testing::fixtures::{SalesRecord, sales_csv};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Write `contents` to `filename`, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, filename: &str, contents: impl AsRef<[u8]>) -> std::io::Result<PathBuf> {
        let path = self.file_path(filename);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write `records` as a CSV file with the canonical header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_sales(&self, filename: &str, records: &[SalesRecord]) -> std::io::Result<PathBuf> {
        self.write_file(filename, sales_csv(records))
    }

    /// Create a subdirectory, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn subdir(&self, name: &str) -> std::io::Result<PathBuf> {
        let path = self.file_path(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

impl Default for TempDirPath {
    fn default() -> Self {
        Self::new().expect("Failed to create temporary directory")
    }
}

/// Read an artifact as raw lines, without trailing newlines.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_lines(path: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect())
}

/// Read a CSV artifact into its header and rows.
///
/// An empty file yields an empty header and no rows.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid CSV.
pub fn read_csv_rows(path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let temp = TempDirPath::new().unwrap();
        assert!(temp.path().exists());
        assert!(temp.path().is_dir());
    }

    #[test]
    fn test_write_and_read_back() {
        let temp = TempDirPath::new().unwrap();
        let path = temp.write_file("a.csv", "x,y\n1,2\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["x,y", "1,2"]);
        let (header, rows) = read_csv_rows(&path).unwrap();
        assert_eq!(header, vec!["x", "y"]);
        assert_eq!(rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }
}
