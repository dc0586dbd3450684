//! Tests for configuration loading and validation.

use salesbeam::config::*;
use salesbeam::testing::TempDirPath;
use salesbeam::{EtlError, ValidationMode};
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.input_dir, PathBuf::from("./data"));
    assert_eq!(cfg.output_dir, PathBuf::from("./output"));
    assert_eq!(cfg.target_product, "pink morsel");
    assert_eq!(cfg.chunk_size, 100);
    assert_eq!(cfg.row_errors, ValidationMode::FailFast);
    assert_eq!(cfg.consolidated_path(), PathBuf::from("./output/converted/result.csv"));
    assert_eq!(cfg.normalized_path(), PathBuf::from("./output/converted/converted.csv"));
    assert_eq!(cfg.report_path(), None);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() -> anyhow::Result<()> {
    let cfg = PipelineConfig::from_toml_str(
        r#"
        output_dir = "out"
        target_product = "gold morsel"
        row_errors = "skip-invalid"
        report_file = "/tmp/report.json"
        parallel_classify = true
        "#,
    )?;
    assert_eq!(cfg.output_dir, PathBuf::from("out"));
    assert_eq!(cfg.target_product, "gold morsel");
    assert_eq!(cfg.row_errors, ValidationMode::SkipInvalid);
    assert!(cfg.parallel_classify);
    assert_eq!(cfg.report_path(), Some(PathBuf::from("/tmp/report.json")));
    assert_eq!(cfg.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));
    assert_eq!(cfg.sniff_bytes, DEFAULT_SNIFF_BYTES);
    Ok(())
}

#[test]
fn test_unknown_key_rejected() {
    let err = PipelineConfig::from_toml_str("chunk_sise = 10").unwrap_err();
    assert!(matches!(err, EtlError::Config(_)));
    assert!(err.to_string().contains("chunk_sise"));
}

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.write_file("salesbeam.toml", "chunk_size = 5\n")?;
    assert_eq!(PipelineConfig::load(&path)?.chunk_size, 5);

    let err = PipelineConfig::load(dir.file_path("missing.toml")).unwrap_err();
    assert!(matches!(err, EtlError::Config(_)));
    Ok(())
}

#[test]
fn test_validate_rejects_bad_values() {
    let base = PipelineConfig::default();
    for bad in [
        PipelineConfig { chunk_size: 0, ..base.clone() },
        PipelineConfig { sniff_bytes: 0, ..base.clone() },
        PipelineConfig { target_product: String::new(), ..base.clone() },
        PipelineConfig {
            normalized_file: base.consolidated_file.clone(),
            ..base.clone()
        },
    ] {
        assert!(matches!(bad.validate(), Err(EtlError::Config(_))), "{bad:?}");
    }
}

#[test]
fn test_artifacts_inside_input_dir_rejected() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let shared = PipelineConfig::with_dirs(dir.path(), dir.path());

    // The default artifact names live in a subdirectory, which the scanner skips.
    assert!(shared.validate().is_ok());

    let flat = PipelineConfig {
        consolidated_file: "result.csv".into(),
        normalized_file: "converted.csv".into(),
        ..shared.clone()
    };
    let err = flat.validate().unwrap_err();
    assert!(matches!(err, EtlError::Config(_)));
    assert!(err.to_string().contains("consolidated_file"));

    let report_in_input = PipelineConfig {
        report_file: Some(dir.file_path("run.json")),
        ..shared
    };
    assert!(report_in_input.validate().unwrap_err().to_string().contains("report_file"));
    Ok(())
}

#[test]
fn test_input_dir_match_ignores_spelling() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let cfg = PipelineConfig {
        input_dir: dir.path().join("."),
        consolidated_file: "result.csv".into(),
        normalized_file: "converted.csv".into(),
        ..PipelineConfig::with_dirs(dir.path(), dir.path())
    };
    assert!(matches!(cfg.validate(), Err(EtlError::Config(_))));
    Ok(())
}
