//! rsiscan runner: configuration, the folder pipeline, progress callbacks and run summaries.
//!
//! This crate builds on `rsiscan-core` to provide:
//! - `PipelineConfig` loaded from TOML, with error and overwrite policies
//! - The per-folder pipeline producing one `StockReport` per raw export
//! - `ScanProgress` callbacks for console output
//! - JSON export of the run summary

pub mod config;
pub mod export;
pub mod pipeline;
pub mod progress;

pub use config::{ConfigError, ErrorPolicy, PipelineConfig};
pub use export::{export_json, import_json, write_summary};
pub use pipeline::{
    FileFailure, Pipeline, PipelineError, RunSummary, StockReport, SCHEMA_VERSION,
};
pub use progress::{format_score_line, ScanProgress, SilentProgress, StdoutProgress};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<ErrorPolicy>();
        assert_sync::<ErrorPolicy>();
    }

    #[test]
    fn pipeline_is_send_sync() {
        assert_send::<Pipeline>();
        assert_sync::<Pipeline>();
    }

    #[test]
    fn summary_types_are_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
        assert_send::<StockReport>();
        assert_sync::<StockReport>();
        assert_send::<FileFailure>();
        assert_sync::<FileFailure>();
    }

    #[test]
    fn pipeline_error_is_send() {
        assert_send::<PipelineError>();
    }
}
