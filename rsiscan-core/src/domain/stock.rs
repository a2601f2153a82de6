//! Stock identifiers derived from raw export filenames.
//!
//! Raw exports follow a hyphen-delimited naming convention, e.g.
//! `Quote-Equity-RELIANCE-EQ-01-01-2024-to-31-12-2024.csv`, where the third
//! segment names the stock. Parsing is strict: a name that does not follow the
//! convention is a typed error, never a silently wrong identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Zero-based position of the identifier among the hyphen-delimited segments.
pub const STOCK_SEGMENT: usize = 2;

const CSV_EXTENSION: &str = ".csv";

/// Identifier of a stock, e.g. `RELIANCE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(String);

impl StockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the identifier out of a raw export filename.
    ///
    /// The `.csv` extension (any case) is removed before splitting, so
    /// `a-b-c.csv` yields `c`.
    pub fn from_file_name(name: &str) -> Result<Self, FileNameError> {
        let stem = strip_csv_extension(name);
        if stem.is_empty() {
            return Err(FileNameError::EmptyStem {
                name: name.to_string(),
            });
        }

        let segments: Vec<&str> = stem.split('-').collect();
        let segment = segments
            .get(STOCK_SEGMENT)
            .ok_or_else(|| FileNameError::TooFewSegments {
                name: name.to_string(),
                found: segments.len(),
            })?;

        if segment.trim().is_empty() {
            return Err(FileNameError::EmptyIdentifier {
                name: name.to_string(),
            });
        }

        Ok(Self((*segment).to_string()))
    }

    /// Parse the identifier from the final component of `path`.
    pub fn from_path(path: &Path) -> Result<Self, FileNameError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileNameError::NotUtf8 {
                path: path.display().to_string(),
            })?;
        Self::from_file_name(name)
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StockId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Returns true if `name` ends in `.csv`, ignoring case.
pub fn has_csv_extension(name: &str) -> bool {
    name.len() >= CSV_EXTENSION.len()
        && name
            .get(name.len() - CSV_EXTENSION.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

fn strip_csv_extension(name: &str) -> &str {
    if has_csv_extension(name) {
        &name[..name.len() - CSV_EXTENSION.len()]
    } else {
        name
    }
}

/// A filename that does not follow the `<a>-<b>-<STOCK>[-...].csv` convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileNameError {
    #[error("file name '{name}' has no stem")]
    EmptyStem { name: String },

    #[error(
        "file name '{name}' has {found} hyphen-delimited segment(s); the stock identifier is segment {}",
        STOCK_SEGMENT + 1
    )]
    TooFewSegments { name: String, found: usize },

    #[error("file name '{name}' has an empty stock identifier segment")]
    EmptyIdentifier { name: String },

    #[error("file name of '{path}' is not valid UTF-8")]
    NotUtf8 { path: String },
}
