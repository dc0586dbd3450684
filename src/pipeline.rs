//! Run orchestration.
//!
//! [`Pipeline`] validates the configuration, then drives a run through
//! scanning, extraction and normalization, tracking progress in [`RunPhase`].
//! Per-file failures are recorded in the [`RunReport`]; anything else stops
//! the run with a [`RunError`] naming the stage.

use crate::classify::{ContentClassifier, SniffingClassifier};
use crate::config::PipelineConfig;
use crate::error::{Result, RunError, Stage};
use crate::extract::Extractor;
use crate::io::csv::ArtifactWriter;
use crate::normalize::{Normalizer, normalized_header};
use crate::report::{FailedFile, RunReport};
use crate::scan::{SourceFile, scan_dir};
use crate::validation::REQUIRED_COLUMNS;
use std::fs::File;
use std::time::Instant;
use tracing::{info, warn};

/// Where a run currently stands.
///
/// `Idle → Scanning → Extracting(1..=n) → Normalizing → Done`. A failed run
/// stays at the phase it failed in; the next [`Pipeline::run`] starts over
/// from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Scanning,
    /// Extracting the `file`-th of `of` accepted files (1-based).
    Extracting { file: usize, of: usize },
    Normalizing,
    Done,
}

/// -------- Pipeline --------
/// Owns the configuration and classifier of a run and drives both stages.
/// Each stage constructs its own artifact writer, so no state carries over
/// between runs.
pub struct Pipeline<C: ContentClassifier = SniffingClassifier> {
    config: PipelineConfig,
    classifier: C,
    phase: RunPhase,
}

impl Pipeline<SniffingClassifier> {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let classifier = SniffingClassifier::new(config.sniff_bytes);
        Self::with_classifier(config, classifier)
    }
}

impl<C: ContentClassifier> Pipeline<C> {
    pub fn with_classifier(config: PipelineConfig, classifier: C) -> Self {
        Self {
            config,
            classifier,
            phase: RunPhase::Idle,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run both stages from scratch.
    ///
    /// Truncates the consolidated artifact before scanning and the normalized
    /// artifact before normalizing.
    ///
    /// # Errors
    /// Returns a [`RunError`] naming the stage for any fatal failure.
    /// Per-file and per-chunk extraction failures are recorded in the
    /// returned report instead.
    pub fn run(&mut self) -> std::result::Result<RunReport, RunError> {
        let started = Instant::now();
        self.phase = RunPhase::Idle;
        self.config
            .validate()
            .map_err(|e| RunError::new(Stage::Configuration, e))?;

        let consolidated = self.config.consolidated_path();
        let mut report = RunReport {
            input_dir: self.config.input_dir.clone(),
            consolidated_path: consolidated.clone(),
            normalized_path: self.config.normalized_path(),
            ..RunReport::default()
        };
        let mut writer = ArtifactWriter::create(&consolidated, REQUIRED_COLUMNS)
            .map_err(|e| RunError::new(Stage::Extraction, e))?;

        self.phase = RunPhase::Scanning;
        let scan = scan_dir(
            &self.config.input_dir,
            &self.classifier,
            self.config.parallel_classify,
        )
        .map_err(|e| RunError::new(Stage::Scanning, e))?;
        report.files_seen = scan.files_seen();
        report.csv_files = scan.csv_count();
        report.rejected_files = scan.rejected;

        self.extract(&scan.accepted, &mut writer, &mut report)
            .map_err(|e| RunError::new(Stage::Extraction, e))?;
        report.rows_extracted = writer
            .finish()
            .map_err(|e| RunError::new(Stage::Extraction, e))?;

        self.phase = RunPhase::Normalizing;
        self.normalize(&mut report)
            .map_err(|e| RunError::new(Stage::Normalization, e))?;

        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if let Some(path) = self.config.report_path() {
            report
                .save_to_file(&path)
                .map_err(|e| RunError::new(Stage::Reporting, e))?;
        }
        self.phase = RunPhase::Done;
        report.log_summary();
        Ok(report)
    }

    fn extract(
        &mut self,
        sources: &[SourceFile],
        writer: &mut ArtifactWriter<File>,
        report: &mut RunReport,
    ) -> Result<()> {
        let mut extractor = Extractor::new(
            writer,
            self.config.target_product.clone(),
            self.config.chunk_size,
        );
        let total = sources.len();
        for (i, source) in sources.iter().enumerate() {
            self.phase = RunPhase::Extracting { file: i + 1, of: total };
            let before = extractor.rows_written();
            match extractor.extract_file(&source.path) {
                Ok(summary) => {
                    info!(
                        path = %source.path.display(),
                        rows = summary.rows_read,
                        matched = summary.rows_matched,
                        "Processed CSV file"
                    );
                    report.extracted_files.push(summary);
                }
                Err(err) if err.is_recoverable() => {
                    warn!(path = %source.path.display(), "skipping rest of file: {err}");
                    report.failed_files.push(FailedFile {
                        path: source.path.clone(),
                        error: err.to_string(),
                        rows_appended: extractor.rows_written() - before,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn normalize(&mut self, report: &mut RunReport) -> Result<()> {
        info!("Converting data...");
        let mut writer = ArtifactWriter::create(&report.normalized_path, normalized_header())?;
        let mut normalizer =
            Normalizer::new(&mut writer, self.config.row_errors, self.config.chunk_size);
        report.normalization = normalizer.normalize_file(&report.consolidated_path)?;
        report.row_errors = normalizer.into_errors().into_errors();
        writer.finish()?;
        Ok(())
    }
}

/// Run a full pipeline with the content-sniffing classifier.
///
/// # Errors
/// See [`Pipeline::run`].
pub fn run(config: PipelineConfig) -> std::result::Result<RunReport, RunError> {
    Pipeline::new(config).run()
}
