//! Per-folder pipeline: ingest → clean → validate → gain/loss → RSI.
//!
//! Files are processed one at a time in directory order. Each file runs the
//! stages to completion before the next file is read. What happens when a
//! file fails is governed by the configured `ErrorPolicy`.

use chrono::NaiveDate;
use rsiscan_core::data::{
    CleanError, CleanReport, Cleaner, IngestError, Ingestor, StockFile, ValidateError,
    ValidationReport, Validator,
};
use rsiscan_core::domain::StockId;
use rsiscan_core::indicators::{GainLoss, Rsi};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ErrorPolicy, PipelineConfig};
use crate::progress::ScanProgress;

/// Current schema version for persisted run summaries.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),
    #[error("clean error: {0}")]
    Clean(#[from] CleanError),
    #[error("validation error: {0}")]
    Validate(#[from] ValidateError),
}

/// Everything learned about one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub stock: StockId,
    /// Raw export the report was built from.
    pub source: PathBuf,
    pub clean_path: PathBuf,
    pub clean: CleanReport,
    pub validation: ValidationReport,
    /// Number of close-to-close intervals available.
    pub intervals: usize,
    /// `None` when fewer intervals than the RSI period were available.
    pub rsi: Option<f64>,
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    /// Absent when the filename itself could not be parsed.
    pub stock: Option<StockId>,
    pub error: String,
}

/// Outcome of one pass over a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub folder: PathBuf,
    pub as_of: NaiveDate,
    pub reports: Vec<StockReport>,
    pub failures: Vec<FileFailure>,
    /// The folder did not exist or was not a directory; nothing was processed.
    pub folder_missing: bool,
}

impl RunSummary {
    fn new(folder: &Path, as_of: NaiveDate) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            folder: folder.to_path_buf(),
            as_of,
            reports: Vec::new(),
            failures: Vec::new(),
            folder_missing: false,
        }
    }

    /// Reports that produced an RSI, in processing order.
    pub fn scored(&self) -> impl Iterator<Item = &StockReport> {
        self.reports.iter().filter(|r| r.rsi.is_some())
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    cleaner: Cleaner,
    rsi: Rsi,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cleaner = config.cleaner()?;
        let rsi = config.rsi()?;
        Ok(Self {
            config,
            cleaner,
            rsi,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every raw export in `folder`, stamping cleaned files with `as_of`.
    ///
    /// A missing folder is not an error: the progress sink is told, and an
    /// empty summary flagged `folder_missing` comes back. Under
    /// `ErrorPolicy::Abort` the first failing file ends the run with its error.
    pub fn run(
        &self,
        folder: &Path,
        as_of: NaiveDate,
        progress: &dyn ScanProgress,
    ) -> Result<RunSummary, PipelineError> {
        let files = match Ingestor::scan(folder) {
            Ok(files) => files,
            Err(
                err @ (IngestError::FolderNotFound { .. } | IngestError::NotADirectory { .. }),
            ) => {
                info!(folder = %folder.display(), "{err}");
                progress.on_folder_unavailable(&err);
                let mut summary = RunSummary::new(folder, as_of);
                summary.folder_missing = true;
                return Ok(summary);
            }
            Err(err) => return Err(err.into()),
        };

        info!(folder = %files.folder().display(), %as_of, "processing folder");
        let mut summary = RunSummary::new(files.folder(), as_of);

        for (index, item) in files.enumerate() {
            let outcome = match item {
                Ok(file) => {
                    progress.on_start(&file, index);
                    self.process_file(&file, as_of)
                        .map_err(|err| (failure(&file.path, Some(&file.stock), &err), err))
                }
                Err(err) => {
                    let path = err.path().to_path_buf();
                    let err = PipelineError::from(err);
                    Err((failure(&path, None, &err), err))
                }
            };

            match outcome {
                Ok(report) => {
                    progress.on_complete(&report);
                    summary.reports.push(report);
                }
                Err((failed, err)) => {
                    warn!(path = %failed.path.display(), error = %err, "file failed");
                    progress.on_failure(&failed);
                    if self.config.on_error == ErrorPolicy::Abort {
                        return Err(err);
                    }
                    summary.failures.push(failed);
                }
            }
        }

        info!(
            processed = summary.reports.len(),
            scored = summary.scored().count(),
            failed = summary.failures.len(),
            "folder complete"
        );
        progress.on_batch_complete(&summary);
        Ok(summary)
    }

    /// Run one raw export through every stage.
    pub fn process_file(
        &self,
        file: &StockFile,
        as_of: NaiveDate,
    ) -> Result<StockReport, PipelineError> {
        let cleaned = self.cleaner.clean(&file.path, &file.stock, as_of)?;
        let validated = Validator::validate(&cleaned.path)?;
        if validated.report.rows_rejected > 0 {
            info!(
                stock = %file.stock,
                rejected = validated.report.rows_rejected,
                by_column = ?validated.report.rejected_by_column,
                "rows rejected during validation"
            );
        }

        let gl = GainLoss::from_records(&validated.records);
        let rsi = self.rsi.compute(&gl);
        match rsi {
            Some(value) => debug!(stock = %file.stock, indicator = self.rsi.name(), value, "scored"),
            None => info!(
                stock = %file.stock,
                intervals = gl.len(),
                needed = self.rsi.period(),
                "not enough history for RSI"
            ),
        }

        Ok(StockReport {
            stock: file.stock.clone(),
            source: file.path.clone(),
            clean_path: cleaned.path,
            clean: cleaned.report,
            validation: validated.report,
            intervals: gl.len(),
            rsi,
        })
    }
}

fn failure(path: &Path, stock: Option<&StockId>, err: &PipelineError) -> FileFailure {
    FileFailure {
        path: path.to_path_buf(),
        stock: stock.cloned(),
        error: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "DATE,SERIES,OPEN,HIGH,LOW,CLOSE,VOLUME\n";

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn pipeline(dir: &TempDir) -> Pipeline {
        Pipeline::new(PipelineConfig {
            output_dir: dir.path().join("clean"),
            ..PipelineConfig::default()
        })
        .unwrap()
    }

    fn write_export(dir: &Path, name: &str, closes: &[f64]) -> PathBuf {
        let mut text = String::from(HEADER);
        for (i, c) in closes.iter().enumerate() {
            text.push_str(&format!("2024-01-{:02},EQ,{c},{c},{c},{c},100\n", i + 1));
        }
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn process_file_scores_full_window() {
        let dir = TempDir::new().unwrap();
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let path = write_export(dir.path(), "Q-E-UP-EQ.csv", &closes);
        let file = StockFile {
            stock: StockId::new("UP"),
            path,
        };

        let report = pipeline(&dir).process_file(&file, as_of()).unwrap();
        assert_eq!(report.rsi, Some(100.0));
        assert_eq!(report.intervals, 14);
        assert_eq!(report.clean.rows_written, 15);
        assert_eq!(report.validation.rows_accepted, 15);
        assert_eq!(
            report.clean_path,
            dir.path().join("clean").join("UP_2024-06-03.csv")
        );
    }

    #[test]
    fn process_file_short_history_has_no_rsi() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), "Q-E-SHORT-EQ.csv", &[1.0, 2.0, 3.0]);
        let file = StockFile {
            stock: StockId::new("SHORT"),
            path,
        };

        let report = pipeline(&dir).process_file(&file, as_of()).unwrap();
        assert_eq!(report.rsi, None);
        assert_eq!(report.intervals, 2);
    }

    #[test]
    fn process_file_surfaces_clean_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Q-E-EMPTY-EQ.csv");
        fs::write(&path, "").unwrap();
        let file = StockFile {
            stock: StockId::new("EMPTY"),
            path,
        };

        let err = pipeline(&dir).process_file(&file, as_of()).unwrap_err();
        assert!(matches!(err, PipelineError::Clean(CleanError::MissingHeader { .. })));
    }

    #[test]
    fn missing_folder_yields_flagged_empty_summary() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let summary = pipeline(&dir)
            .run(&missing, as_of(), &SilentProgress)
            .unwrap();

        assert!(summary.folder_missing);
        assert!(summary.reports.is_empty());
        assert!(summary.failures.is_empty());
        assert!(!dir.path().join("clean").exists());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = PipelineConfig {
            rsi_period: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(Pipeline::new(config), Err(ConfigError::ZeroPeriod)));
    }

    #[test]
    fn scored_skips_reports_without_rsi() {
        let dir = TempDir::new().unwrap();
        let long: Vec<f64> = (0..20).map(|i| 50.0 - i as f64).collect();
        write_export(dir.path(), "Q-E-LONG-EQ.csv", &long);
        write_export(dir.path(), "Q-E-SHORT-EQ.csv", &[1.0, 2.0]);

        let summary = pipeline(&dir)
            .run(dir.path(), as_of(), &SilentProgress)
            .unwrap();
        assert_eq!(summary.reports.len(), 2);
        let scored: Vec<&str> = summary.scored().map(|r| r.stock.as_str()).collect();
        assert_eq!(scored, vec!["LONG"]);
        assert_eq!(summary.scored().next().unwrap().rsi, Some(0.0));
    }
}
