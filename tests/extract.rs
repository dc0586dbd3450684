//! Tests for the extraction/filter stage.

use salesbeam::extract::*;
use salesbeam::io::csv::{ArtifactWriter, CsvChunks};
use salesbeam::testing::*;
use salesbeam::validation::REQUIRED_COLUMNS;
use salesbeam::EtlError;
use std::io::Cursor;

fn memory_writer() -> ArtifactWriter<Vec<u8>> {
    ArtifactWriter::from_writer("result.csv", Vec::new(), REQUIRED_COLUMNS)
}

fn output(writer: ArtifactWriter<Vec<u8>>) -> anyhow::Result<String> {
    let (_, sink) = writer.into_inner()?;
    Ok(String::from_utf8(sink)?)
}

#[test]
fn test_filter_keeps_only_exact_target() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_sales("sales.csv", &sample_sales())?;
    let mut writer = memory_writer();

    let summary = Extractor::new(&mut writer, "pink morsel", 100).extract_file(&path)?;
    assert_eq!(summary.rows_read, 6);
    assert_eq!(summary.rows_matched, 3);
    assert_eq!(
        summary.chunks,
        vec![ChunkOutcome::Accepted { chunk: 0, rows: 6, matched: 3 }]
    );

    let text = output(writer)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "product,price,quantity,date,region");
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|l| l.starts_with("pink morsel,")));
    assert!(!text.contains("Pink Morsel"));
    Ok(())
}

#[test]
fn test_columns_projected_to_canonical_order() -> anyhow::Result<()> {
    let text = csv_text(
        &["region", "note", "date", "quantity", "price", "product"],
        &[&["west", "n/a", "2024-01-05", "2", "$1,234.50", "pink morsel"]],
    );
    let chunk = CsvChunks::from_reader(Cursor::new(text), 10)?.next().unwrap()?;
    let mut writer = memory_writer();

    let outcome = Extractor::new(&mut writer, "pink morsel", 10).process_chunk(&chunk)?;
    assert_eq!(outcome.matched(), 1);
    assert_eq!(
        output(writer)?,
        "product,price,quantity,date,region\npink morsel,\"$1,234.50\",2,2024-01-05,west\n"
    );
    Ok(())
}

#[test]
fn test_missing_column_rejects_whole_chunk() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_file(
        "no_region.csv",
        csv_text(
            &["product", "price", "quantity", "date"],
            &[&["pink morsel", "$3.00", "1", "2024-01-05"]],
        ),
    )?;
    let mut writer = memory_writer();

    let summary = Extractor::new(&mut writer, "pink morsel", 100).extract_file(&path)?;
    assert_eq!(summary.rows_matched, 0);
    assert_eq!(summary.chunks_rejected(), 1);
    let outcome = &summary.chunks[0];
    assert!(outcome.is_rejected());
    assert_eq!(
        outcome,
        &ChunkOutcome::Rejected { chunk: 0, rows: 1, missing: vec!["region".into()] }
    );
    let err = outcome.to_error(&path).unwrap();
    assert!(matches!(err, EtlError::SchemaValidation { chunk: 0, .. }));
    assert!(err.to_string().contains("region"));

    assert!(!writer.header_written());
    assert_eq!(output(writer)?, "");
    Ok(())
}

#[test]
fn test_header_written_once_across_files_and_chunks() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let a = dir.write_sales("a.csv", &numbered_sales(7))?;
    let b = dir.write_sales("b.csv", &sample_sales())?;
    let mut writer = memory_writer();

    let mut extractor = Extractor::new(&mut writer, "pink morsel", 3);
    let first = extractor.extract_file(&a)?;
    let second = extractor.extract_file(&b)?;
    assert_eq!(first.chunks.len(), 3);
    assert_eq!(second.chunks.len(), 2);
    assert_eq!(extractor.rows_written(), 10);

    let text = output(writer)?;
    let headers = text
        .lines()
        .filter(|l| *l == "product,price,quantity,date,region")
        .count();
    assert_eq!(headers, 1);
    assert_eq!(text.lines().count(), 11);
    Ok(())
}

#[test]
fn test_malformed_file_keeps_earlier_chunks() -> anyhow::Result<()> {
    let mut text = sales_csv(&numbered_sales(4));
    text.push_str("pink morsel,$1.00\n");
    let dir = TempDirPath::new()?;
    let path = dir.write_file("ragged.csv", text)?;
    let mut writer = memory_writer();

    let mut extractor = Extractor::new(&mut writer, "pink morsel", 2);
    let err = extractor.extract_file(&path).unwrap_err();
    assert!(matches!(err, EtlError::Parse { .. }));
    assert!(err.is_recoverable());
    assert_eq!(extractor.rows_written(), 4);
    Ok(())
}

#[test]
fn test_unopenable_source_is_recoverable() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let mut writer = memory_writer();

    let err = Extractor::new(&mut writer, "pink morsel", 10)
        .extract_file(&dir.file_path("vanished.csv"))
        .unwrap_err();
    assert!(matches!(err, EtlError::Parse { .. }));
    assert!(err.is_recoverable());
    Ok(())
}
