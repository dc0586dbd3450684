//! Pre-built sales records and CSV text for testing.

use crate::config::DEFAULT_TARGET_PRODUCT;
use crate::validation::REQUIRED_COLUMNS;
use serde::{Deserialize, Serialize};

/// One source row in the canonical column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product: String,
    pub price: String,
    pub quantity: i64,
    pub date: String,
    pub region: String,
}

impl SalesRecord {
    pub fn new(
        product: impl Into<String>,
        price: impl Into<String>,
        quantity: i64,
        date: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            price: price.into(),
            quantity,
            date: date.into(),
            region: region.into(),
        }
    }

    /// A record for the default target product.
    pub fn pink(price: impl Into<String>, quantity: i64, date: impl Into<String>, region: impl Into<String>) -> Self {
        Self::new(DEFAULT_TARGET_PRODUCT, price, quantity, date, region)
    }

    /// The record as a consolidated-artifact line, without the newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            quote(&self.product),
            quote(&self.price),
            self.quantity,
            quote(&self.date),
            quote(&self.region)
        )
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// A small mixed batch: three target rows among other products.
///
/// # Example
///
/// ```
/// use salesbeam::testing::sample_sales;
///
/// let rows = sample_sales();
/// assert_eq!(rows.iter().filter(|r| r.product == "pink morsel").count(), 3);
/// ```
#[must_use]
pub fn sample_sales() -> Vec<SalesRecord> {
    vec![
        SalesRecord::new("chocolate morsel", "$3.00", 546, "2018-02-06", "north"),
        SalesRecord::pink("$3.00", 549, "2018-02-06", "south"),
        SalesRecord::new("gold morsel", "$9.99", 12, "2018-02-06", "east"),
        SalesRecord::pink("$1,234.50", 2, "2018-02-07", "west"),
        SalesRecord::new("Pink Morsel", "$3.00", 1, "2018-02-07", "west"),
        SalesRecord::pink("$5.00", 10, "2018-02-08", "east"),
    ]
}

/// `n` distinct target rows, numbered by quantity `1..=n`.
#[must_use]
pub fn numbered_sales(n: usize) -> Vec<SalesRecord> {
    (1..=n)
        .map(|i| {
            let day = (i % 28) + 1;
            SalesRecord::pink(format!("${i}.25"), i as i64, format!("2021-03-{day:02}"), format!("region-{i}"))
        })
        .collect()
}

/// CSV text with the canonical header followed by `records`.
#[must_use]
pub fn sales_csv(records: &[SalesRecord]) -> String {
    let mut out = REQUIRED_COLUMNS.join(",");
    out.push('\n');
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// CSV text with an arbitrary header and raw rows.
#[must_use]
pub fn csv_text(header: &[&str], rows: &[&[&str]]) -> String {
    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
        out.push('\n');
    }
    out
}

/// Prose that is not CSV, whatever the file is called.
#[must_use]
pub fn plain_text() -> &'static str {
    "Quarterly notes\nSales were strong this quarter, especially in the west.\nNothing else to report.\n"
}
