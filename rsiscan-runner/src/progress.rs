//! Progress callbacks for a folder run.

use rsiscan_core::data::{IngestError, StockFile};

use crate::pipeline::{FileFailure, RunSummary, StockReport};

/// Progress callback for multi-file runs.
pub trait ScanProgress: Send {
    /// Called when the input folder cannot be used at all.
    fn on_folder_unavailable(&self, error: &IngestError);

    /// Called when starting to process a file.
    fn on_start(&self, file: &StockFile, index: usize);

    /// Called when a file made it through every stage.
    fn on_complete(&self, report: &StockReport);

    /// Called when a file failed.
    fn on_failure(&self, failure: &FileFailure);

    /// Called when the whole folder is done.
    fn on_batch_complete(&self, summary: &RunSummary);
}

/// `"<stock> <rsi>"` for a scored report.
pub fn format_score_line(report: &StockReport) -> Option<String> {
    report.rsi.map(|rsi| format!("{} {rsi}", report.stock))
}

/// Console reporter: one score line per scored stock on stdout, folder
/// diagnostics on stderr.
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_folder_unavailable(&self, error: &IngestError) {
        match error {
            IngestError::FolderNotFound { path } => {
                eprintln!("Folder path doesn't exist: {}", path.display())
            }
            other => eprintln!("{other}"),
        }
    }

    fn on_start(&self, _file: &StockFile, _index: usize) {}

    fn on_complete(&self, report: &StockReport) {
        if let Some(line) = format_score_line(report) {
            println!("{line}");
        }
    }

    // Failures are logged by the pipeline.
    fn on_failure(&self, _failure: &FileFailure) {}

    fn on_batch_complete(&self, _summary: &RunSummary) {}
}

pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_folder_unavailable(&self, _error: &IngestError) {}
    fn on_start(&self, _file: &StockFile, _index: usize) {}
    fn on_complete(&self, _report: &StockReport) {}
    fn on_failure(&self, _failure: &FileFailure) {}
    fn on_batch_complete(&self, _summary: &RunSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsiscan_core::data::{CleanReport, ValidationReport};
    use rsiscan_core::domain::StockId;
    use std::path::PathBuf;

    fn report(rsi: Option<f64>) -> StockReport {
        StockReport {
            stock: StockId::new("TCS"),
            source: PathBuf::from("raw/Quote-Equity-TCS-EQ.csv"),
            clean_path: PathBuf::from("DATA/CLEAN/TCS_2024-01-01.csv"),
            clean: CleanReport::default(),
            validation: ValidationReport::default(),
            intervals: 20,
            rsi,
        }
    }

    #[test]
    fn score_line_uses_shortest_float_form() {
        assert_eq!(format_score_line(&report(Some(100.0))).as_deref(), Some("TCS 100"));
        assert_eq!(format_score_line(&report(Some(62.5))).as_deref(), Some("TCS 62.5"));
        assert_eq!(
            format_score_line(&report(Some(74.07407407407408))).as_deref(),
            Some("TCS 74.07407407407408")
        );
    }

    #[test]
    fn unscored_report_has_no_line() {
        assert_eq!(format_score_line(&report(None)), None);
    }
}
