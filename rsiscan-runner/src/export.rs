//! Run summary export.
//!
//! Summaries are written as pretty JSON carrying a `schema_version` field.
//! Unknown (newer) versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::pipeline::{RunSummary, SCHEMA_VERSION};

/// Serialize a `RunSummary` to pretty JSON.
pub fn export_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

/// Deserialize a `RunSummary` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunSummary> {
    let summary: RunSummary =
        serde_json::from_str(json).context("failed to deserialize RunSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

/// Write `summary` to `path`, creating parent directories as needed.
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = export_json(summary)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
