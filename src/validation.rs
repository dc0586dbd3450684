//! Data quality and validation utilities for the ETL stages.
//!
//! This module provides the pieces both stages use to handle bad data:
//! - **Error handling modes** - skip bad rows, log and continue, or fail fast
//! - **Schema checks** - verify that a chunk carries the required column set
//! - **Error collectors** - accumulate row errors for the run report
//!
//! # Example
//!
//! ```
//! use salesbeam::validation::*;
//!
//! let headers = csv::StringRecord::from(vec!["product", "price", "quantity", "date"]);
//! let missing = missing_columns(&headers, &REQUIRED_COLUMNS);
//! assert_eq!(missing, vec!["region".to_string()]);
//!
//! let mut collector = ErrorCollector::new();
//! collector.add_error(
//!     Some("line 7".into()),
//!     vec![ValidationError::field("price", "not numeric").with_code("numeric_conversion")],
//! );
//! assert_eq!(collector.error_count(), 1);
//! ```

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns every source chunk must carry, in the order they are written to the
/// consolidated artifact.
pub const REQUIRED_COLUMNS: [&str; 5] = ["product", "price", "quantity", "date", "region"];

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Error code for categorization (optional)
    pub code: Option<String>,
}

impl ValidationError {
    /// Create a validation error for a specific field.
    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a validation error with an error code.
    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref code) = self.code {
            write!(f, " (code: {})", code)?;
        }
        Ok(())
    }
}

/// Defines how normalization handles a row that fails conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Skip invalid rows, counting them without logging each one
    SkipInvalid,
    /// Log invalid rows to the error collector and continue processing
    LogAndContinue,
    /// Abort the run on the first invalid row
    #[default]
    FailFast,
}

impl ValidationMode {
    /// The name used in configuration files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::SkipInvalid => "skip-invalid",
            ValidationMode::LogAndContinue => "log-and-continue",
            ValidationMode::FailFast => "fail-fast",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "skip-invalid" | "skip" => Ok(ValidationMode::SkipInvalid),
            "log-and-continue" | "log" => Ok(ValidationMode::LogAndContinue),
            "fail-fast" | "fail" => Ok(ValidationMode::FailFast),
            other => Err(format!(
                "unknown validation mode '{other}' (expected skip-invalid, log-and-continue or fail-fast)"
            )),
        }
    }
}

/// Collects validation errors for batch reporting.
///
/// Use this to accumulate errors when using [`ValidationMode::LogAndContinue`].
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<RecordError>,
}

/// A validation error with optional record context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordError {
    /// Index or identifier of the record that failed
    pub record_id: Option<String>,
    /// The validation errors for this record
    pub errors: Vec<ValidationError>,
}

impl ErrorCollector {
    /// Create a new empty error collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a record.
    pub fn add_error(&mut self, record_id: Option<String>, errors: Vec<ValidationError>) {
        self.errors.push(RecordError { record_id, errors });
    }

    /// Get the total number of failed records.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Get all collected errors.
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    /// Consume the collector, returning its errors in the order they were added.
    pub fn into_errors(self) -> Vec<RecordError> {
        self.errors
    }
}

/// Names of `required` columns absent from `headers`, in `required` order.
#[must_use]
pub fn missing_columns(headers: &StringRecord, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !headers.iter().any(|h| h == **name))
        .map(|name| (*name).to_string())
        .collect()
}

/// Position of each of `columns` within `headers`, or `None` if any is absent.
///
/// Duplicate header names resolve to their first occurrence.
#[must_use]
pub fn column_positions(headers: &StringRecord, columns: &[&str]) -> Option<Vec<usize>> {
    columns
        .iter()
        .map(|name| headers.iter().position(|h| h == *name))
        .collect()
}
