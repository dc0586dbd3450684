//! Tests for content-based classification.

use salesbeam::classify::*;
use salesbeam::testing::*;

#[test]
fn test_csv_detected_regardless_of_extension() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_sales("export.dat", &sample_sales())?;

    let sniffer = SniffingClassifier::default();
    assert_eq!(sniffer.classify(&path)?, ContentType::Csv);
    Ok(())
}

#[test]
fn test_prose_named_csv_is_plain_text() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_file("data.csv", plain_text())?;

    let content = SniffingClassifier::default().classify(&path)?;
    assert_eq!(content, ContentType::PlainText);
    assert_eq!(content.mime(), "text/plain");
    assert!(!content.is_csv());
    Ok(())
}

#[test]
fn test_empty_file() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_file("empty.csv", "")?;

    assert_eq!(SniffingClassifier::default().classify(&path)?, ContentType::Empty);
    Ok(())
}

#[test]
fn test_binary_signatures() {
    let sniffer = SniffingClassifier::default();
    assert_eq!(
        sniffer.classify_bytes(b"%PDF-1.7\n...", true),
        ContentType::Signature("application/pdf")
    );
    assert_eq!(
        sniffer.classify_bytes(b"PK\x03\x04rest", true).mime(),
        "application/zip"
    );
    assert_eq!(sniffer.classify_bytes(b"a,b\n\x00\x01\n", true), ContentType::Binary);
    assert_eq!(sniffer.classify_bytes(&[0xff, 0xfe, 0x41, 0x2c], true), ContentType::Binary);
}

#[test]
fn test_single_column_or_single_record_is_not_csv() {
    let sniffer = SniffingClassifier::default();
    assert_eq!(sniffer.classify_bytes(b"name\nalice\nbob\n", true), ContentType::PlainText);
    assert_eq!(sniffer.classify_bytes(b"a,b,c\n", true), ContentType::PlainText);
    assert_eq!(sniffer.classify_bytes(b"a,b,c\n1,2\n", true), ContentType::PlainText);
}

#[test]
fn test_bom_and_quoted_fields() {
    let sniffer = SniffingClassifier::default();
    let text = "\u{feff}product,price\n\"pink morsel\",\"$1,234.50\"\n";
    assert_eq!(sniffer.classify_bytes(text.as_bytes(), true), ContentType::Csv);
}

#[test]
fn test_small_sample_still_sees_csv() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_sales("big.csv", &numbered_sales(500))?;

    let sniffer = SniffingClassifier::new(128);
    assert_eq!(sniffer.sample_len(), 128);
    assert_eq!(sniffer.classify(&path)?, ContentType::Csv);
    Ok(())
}

#[test]
fn test_missing_file_is_classification_error() {
    let dir = TempDirPath::new().unwrap();
    let err = SniffingClassifier::default()
        .classify(&dir.file_path("nope.csv"))
        .unwrap_err();
    assert!(matches!(err, salesbeam::EtlError::Classification { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_fixed_classifier_double() -> anyhow::Result<()> {
    let classifier = FixedClassifier::new(ContentType::Csv)
        .with("notes.csv", ContentType::PlainText)
        .failing("locked.csv");
    let dir = TempDirPath::new()?;

    assert_eq!(classifier.classify(&dir.file_path("a.csv"))?, ContentType::Csv);
    assert_eq!(classifier.classify(&dir.file_path("notes.csv"))?, ContentType::PlainText);
    assert!(classifier.classify(&dir.file_path("locked.csv")).is_err());
    Ok(())
}
