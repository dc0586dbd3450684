//! Normalization stage.
//!
//! Reads the consolidated artifact chunk by chunk and reshapes every row into
//! `Sales,Date,Region`:
//!
//! - `price` loses its currency symbols and thousands separators and is read
//!   as a decimal,
//! - `Sales` is `price * quantity`,
//! - `date` is parsed and written back as ISO `YYYY-MM-DD`,
//! - `product`, `price` and `quantity` are dropped.
//!
//! Rows that fail conversion are handled according to the configured
//! [`ValidationMode`].
//!
//! ```
//! use salesbeam::normalize::{format_sales, parse_date, parse_price};
//!
//! let price = parse_price("$1,234.50").unwrap();
//! assert_eq!(format_sales(price * 2.0), "2469.00");
//! assert_eq!(parse_date("01/05/2024").unwrap().to_string(), "2024-01-05");
//! ```

use crate::error::{EtlError, Result};
use crate::io::csv::{ArtifactWriter, CsvChunk, open_csv_chunks};
use crate::validation::{
    ErrorCollector, REQUIRED_COLUMNS, ValidationError, ValidationMode, column_positions,
    missing_columns,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Output fields, in output order, before capitalization.
pub const NORMALIZED_FIELDS: [&str; 3] = ["sales", "date", "region"];

/// Currency symbols, thousands separators and stray whitespace.
static CURRENCY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$£€¥,\s]").expect("currency pattern is valid"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// One row of the normalized artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub sales: f64,
    pub date: NaiveDate,
    pub region: String,
}

impl NormalizedRow {
    /// The row as written: `[Sales, Date, Region]`.
    #[must_use]
    pub fn to_record(&self) -> [String; 3] {
        [
            format_sales(self.sales),
            self.date.format("%Y-%m-%d").to_string(),
            self.region.clone(),
        ]
    }
}

/// `["Sales", "Date", "Region"]`.
#[must_use]
pub fn normalized_header() -> Vec<String> {
    NORMALIZED_FIELDS.iter().map(|f| capitalize(f)).collect()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse a currency-formatted price such as `$1,234.50`.
///
/// Returns `None` if anything other than a finite decimal remains once
/// currency symbols, separators and whitespace are removed.
#[must_use]
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = CURRENCY_NOISE.replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[must_use]
pub fn parse_quantity(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Parse a date in one of the accepted shapes. Times of day are discarded.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Render a sales amount: two decimals for whole cents, full precision
/// otherwise.
#[must_use]
pub fn format_sales(value: f64) -> String {
    let cents = value * 100.0;
    if (cents - cents.round()).abs() < 1e-6 {
        format!("{value:.2}")
    } else {
        value.to_string()
    }
}

/// Column positions of the fields normalization reads.
#[derive(Debug, Clone, Copy)]
struct Columns {
    price: usize,
    quantity: usize,
    date: usize,
    region: usize,
}

impl Columns {
    fn locate(chunk: &CsvChunk, artifact: &Path) -> Result<Self> {
        let positions = column_positions(&chunk.headers, &REQUIRED_COLUMNS).ok_or_else(|| {
            EtlError::SchemaValidation {
                path: artifact.to_path_buf(),
                chunk: chunk.index,
                missing: missing_columns(&chunk.headers, &REQUIRED_COLUMNS),
            }
        })?;
        Ok(Self {
            price: positions[1],
            quantity: positions[2],
            date: positions[3],
            region: positions[4],
        })
    }
}

/// Convert one consolidated row. `line` is its 1-based line in `artifact`.
fn normalize_record(
    row: &csv::StringRecord,
    cols: Columns,
    artifact: &Path,
    line: u64,
) -> Result<NormalizedRow> {
    let field = |i: usize| row.get(i).unwrap_or("");
    let numeric_error = |name: &'static str, value: &str| EtlError::NumericConversion {
        artifact: artifact.to_path_buf(),
        line,
        field: name,
        value: value.to_string(),
    };

    let price = parse_price(field(cols.price)).ok_or_else(|| numeric_error("price", field(cols.price)))?;
    let quantity =
        parse_quantity(field(cols.quantity)).ok_or_else(|| numeric_error("quantity", field(cols.quantity)))?;
    let date = parse_date(field(cols.date)).ok_or_else(|| EtlError::DateParse {
        artifact: artifact.to_path_buf(),
        line,
        value: field(cols.date).to_string(),
    })?;
    Ok(NormalizedRow {
        sales: price * quantity as f64,
        date,
        region: field(cols.region).to_string(),
    })
}

/// Counters for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeSummary {
    pub chunks: usize,
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
}

/// Reshapes consolidated rows into the normalized artifact.
pub struct Normalizer<'w, W: Write> {
    writer: &'w mut ArtifactWriter<W>,
    mode: ValidationMode,
    chunk_size: usize,
    errors: ErrorCollector,
}

impl<'w, W: Write> Normalizer<'w, W> {
    pub fn new(writer: &'w mut ArtifactWriter<W>, mode: ValidationMode, chunk_size: usize) -> Self {
        Self {
            writer,
            mode,
            chunk_size: chunk_size.max(1),
            errors: ErrorCollector::new(),
        }
    }

    /// Stream `artifact` and append its normalized rows.
    ///
    /// # Errors
    /// Any error is fatal here: a missing or malformed artifact, a schema
    /// mismatch, a write failure, or a row failure under
    /// [`ValidationMode::FailFast`].
    pub fn normalize_file(&mut self, artifact: &Path) -> Result<NormalizeSummary> {
        let mut summary = NormalizeSummary::default();
        for chunk in open_csv_chunks(artifact, self.chunk_size)? {
            let chunk = chunk.map_err(|source| EtlError::Parse {
                path: artifact.to_path_buf(),
                source,
            })?;
            let (written, skipped) = self.process_chunk(&chunk, artifact)?;
            debug!(chunk = chunk.index, rows = chunk.len(), written, skipped, "normalized chunk");
            summary.chunks += 1;
            summary.rows_read += chunk.len() as u64;
            summary.rows_written += written as u64;
            summary.rows_skipped += skipped as u64;
        }
        Ok(summary)
    }

    /// Normalize one chunk, returning `(written, skipped)` row counts.
    ///
    /// # Errors
    /// See [`normalize_file`](Self::normalize_file).
    pub fn process_chunk(&mut self, chunk: &CsvChunk, artifact: &Path) -> Result<(usize, usize)> {
        let cols = Columns::locate(chunk, artifact)?;
        let first_line = (chunk.index * self.chunk_size) as u64 + 2;
        let mut out = Vec::with_capacity(chunk.len());
        let mut skipped = 0usize;
        for (i, row) in chunk.rows.iter().enumerate() {
            let line = row.position().map_or(first_line + i as u64, |p| p.line());
            match normalize_record(row, cols, artifact, line) {
                Ok(normalized) => out.push(normalized),
                Err(err) => {
                    self.reject_row(err, artifact, line)?;
                    skipped += 1;
                }
            }
        }
        let written = self.writer.append(out.iter().map(NormalizedRow::to_record))?;
        Ok((written, skipped))
    }

    fn reject_row(&mut self, err: EtlError, artifact: &Path, line: u64) -> Result<()> {
        match self.mode {
            ValidationMode::FailFast => Err(err),
            ValidationMode::LogAndContinue => {
                warn!(artifact = %artifact.display(), line, "skipping row: {err}");
                let (field, code) = match &err {
                    EtlError::NumericConversion { field, .. } => (*field, "numeric_conversion"),
                    EtlError::DateParse { .. } => ("date", "date_parse"),
                    _ => ("row", "invalid_row"),
                };
                self.errors.add_error(
                    Some(format!("{}:{line}", artifact.display())),
                    vec![ValidationError::field(field, err.to_string()).with_code(code)],
                );
                Ok(())
            }
            ValidationMode::SkipInvalid => {
                debug!(artifact = %artifact.display(), line, "skipping row: {err}");
                Ok(())
            }
        }
    }

    /// Row errors recorded under [`ValidationMode::LogAndContinue`].
    #[must_use]
    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> ErrorCollector {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_capitalized_in_order() {
        assert_eq!(normalized_header(), vec!["Sales", "Date", "Region"]);
    }

    #[test]
    fn sales_keeps_sub_cent_precision() {
        assert_eq!(format_sales(2469.0), "2469.00");
        assert_eq!(format_sales(0.375), "0.375");
    }

    #[test]
    fn residual_characters_are_rejected() {
        assert_eq!(parse_price("£ 12.00"), Some(12.0));
        assert_eq!(parse_price("$12.00 USD"), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price("inf"), None);
    }
}
