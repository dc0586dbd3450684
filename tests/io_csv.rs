//! Tests for chunked CSV reading and the artifact writer.

use salesbeam::io::csv::*;
use salesbeam::testing::*;
use std::io::Cursor;

#[test]
fn test_chunks_split_and_keep_order() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_sales("rows.csv", &numbered_sales(150))?;

    let chunks: Vec<CsvChunk> = open_csv_chunks(&path, 100)?.collect::<Result<_, _>>()?;
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].len(), 100);
    assert_eq!(chunks[1].index, 1);
    assert_eq!(chunks[1].len(), 50);
    assert_eq!(&chunks[1].headers, &chunks[0].headers);
    assert_eq!(chunks[0].rows[0].get(2), Some("1"));
    assert_eq!(chunks[1].rows[49].get(2), Some("150"));
    Ok(())
}

#[test]
fn test_header_only_source_yields_no_chunks() -> anyhow::Result<()> {
    let chunks = CsvChunks::from_reader(Cursor::new("product,price\n"), 10)?;
    assert_eq!(chunks.headers().len(), 2);
    assert_eq!(chunks.count(), 0);
    Ok(())
}

#[test]
fn test_ragged_row_stops_iteration_after_one_error() -> anyhow::Result<()> {
    let text = "a,b\n1,2\n3,4\n5\n6,7\n";
    let mut chunks = CsvChunks::from_reader(Cursor::new(text), 2)?;

    let first = chunks.next().unwrap()?;
    assert_eq!(first.len(), 2);
    assert!(chunks.next().unwrap().is_err());
    assert!(chunks.next().is_none());
    Ok(())
}

#[test]
fn test_missing_source_is_io_error() {
    let dir = TempDirPath::new().unwrap();
    let err = open_csv_chunks(dir.file_path("nope.csv"), 10).err().unwrap();
    assert!(matches!(err, salesbeam::EtlError::Io { .. }));
}

#[test]
fn test_writer_header_written_once_across_appends() -> anyhow::Result<()> {
    let mut writer = ArtifactWriter::from_writer("mem.csv", Vec::new(), ["x", "y"]);
    assert_eq!(writer.append(Vec::<Vec<&str>>::new())?, 0);
    assert!(!writer.header_written());

    writer.append([["1", "2"]])?;
    writer.append([["3", "4"], ["5", "6"]])?;
    assert!(writer.header_written());
    assert_eq!(writer.rows_written(), 3);

    let (rows, sink) = writer.into_inner()?;
    assert_eq!(rows, 3);
    assert_eq!(String::from_utf8(sink)?, "x,y\n1,2\n3,4\n5,6\n");
    Ok(())
}

#[test]
fn test_writer_with_no_rows_leaves_empty_file() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("out/nested/result.csv");

    let writer = ArtifactWriter::create(&path, ["a", "b"])?;
    assert_eq!(writer.path(), path.as_path());
    assert_eq!(writer.finish()?, 0);
    assert_empty_artifact(&path);
    Ok(())
}

#[test]
fn test_create_truncates_previous_contents() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_file("result.csv", "stale,data\n1,2\n")?;

    let mut writer = ArtifactWriter::create(&path, ["a", "b"])?;
    writer.append([["x", "y"]])?;
    writer.finish()?;

    assert_eq!(read_lines(&path)?, vec!["a,b", "x,y"]);
    Ok(())
}

#[test]
fn test_writer_quotes_fields_with_commas() -> anyhow::Result<()> {
    let mut writer = ArtifactWriter::from_writer("mem.csv", Vec::new(), ["price"]);
    writer.append([["$1,234.50"]])?;
    let (_, sink) = writer.into_inner()?;
    assert_eq!(String::from_utf8(sink)?, "price\n\"$1,234.50\"\n");
    Ok(())
}
