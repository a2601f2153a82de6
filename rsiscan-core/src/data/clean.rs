//! Cleaner: project a raw export onto the required columns and drop
//! incomplete rows.
//!
//! For each data row, a required field is kept only if it is non-empty and
//! not a placeholder, with thousands separators (`,`) removed. A row is
//! written only when all six required fields survive. Dropped rows are never
//! errors; they are tallied in a `CleanReport`.

use crate::data::schema::ColumnSchema;
use crate::domain::record::FIELD_COUNT;
use crate::domain::stock::StockId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default directory cleaned files are written to, relative to the working
/// directory.
pub const DEFAULT_OUTPUT_DIR: &str = "DATA/CLEAN";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// What to do when today's cleaned file for a stock already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Fail the file with `CleanError::OutputExists`.
    Error,
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown overwrite policy '{other}' (expected overwrite or error)"
            )),
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => f.write_str("overwrite"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Why a raw row was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A required field was empty, absent, or only separators.
    MissingField,
    /// A required field held a placeholder such as `NA` or `-`.
    Placeholder,
    /// The header does not map to exactly six required columns.
    FieldCount,
}

/// Row counters for one cleaned file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub dropped_missing_field: usize,
    pub dropped_placeholder: usize,
    pub dropped_field_count: usize,
    /// Required columns absent from the raw header.
    pub missing_columns: Vec<String>,
}

impl CleanReport {
    fn record_drop(&mut self, reason: DropReason) {
        self.rows_dropped += 1;
        match reason {
            DropReason::MissingField => self.dropped_missing_field += 1,
            DropReason::Placeholder => self.dropped_placeholder += 1,
            DropReason::FieldCount => self.dropped_field_count += 1,
        }
    }
}

/// Result of cleaning one file.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub path: PathBuf,
    pub report: CleanReport,
}

/// Writes `<stock>_<YYYY-MM-DD>.csv` files under a fixed output directory.
#[derive(Debug, Clone)]
pub struct Cleaner {
    schema: ColumnSchema,
    output_dir: PathBuf,
    overwrite: OverwritePolicy,
}

impl Cleaner {
    pub fn new(schema: ColumnSchema, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            output_dir: output_dir.into(),
            overwrite: OverwritePolicy::default(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Path of the cleaned file for `stock` processed on `as_of`.
    pub fn output_path(&self, stock: &StockId, as_of: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("{stock}_{}.csv", as_of.format("%Y-%m-%d")))
    }

    /// Clean `source` into the output directory, creating it if needed.
    ///
    /// On failure the partially written output file is removed.
    pub fn clean(
        &self,
        source: &Path,
        stock: &StockId,
        as_of: NaiveDate,
    ) -> Result<CleanOutput, CleanError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| CleanError::io(&self.output_dir, e))?;

        let path = self.output_path(stock, as_of);
        let input = File::open(source).map_err(|e| CleanError::io(source, e))?;
        let output = match self.overwrite {
            OverwritePolicy::Error => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => CleanError::OutputExists { path: path.clone() },
                    _ => CleanError::io(&path, e),
                })?,
            OverwritePolicy::Overwrite => {
                if path.exists() {
                    debug!(path = %path.display(), "overwriting existing cleaned file");
                }
                File::create(&path).map_err(|e| CleanError::io(&path, e))?
            }
        };

        match self.clean_rows(input, output) {
            Ok(report) => {
                debug!(
                    %stock,
                    read = report.rows_read,
                    written = report.rows_written,
                    dropped = report.rows_dropped,
                    "cleaned raw export"
                );
                Ok(CleanOutput { path, report })
            }
            Err(err) => {
                let _ = fs::remove_file(&path);
                Err(err.with_path(source))
            }
        }
    }

    /// Clean CSV text from `reader` into `writer`.
    ///
    /// The first row is the header; a leading byte-order mark is ignored.
    /// Rows may be ragged; missing trailing fields count as empty.
    pub fn clean_rows<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
    ) -> Result<CleanReport, CleanError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr.headers()?.clone();
        if header.is_empty() {
            return Err(CleanError::MissingHeader { path: None });
        }
        let names: Vec<&str> = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == 0 {
                    name.trim_start_matches(BYTE_ORDER_MARK)
                } else {
                    name
                }
            })
            .collect();

        let positions = self.schema.project(names.iter().copied());
        let mut report = CleanReport {
            missing_columns: self
                .schema
                .missing(names.iter().copied())
                .into_iter()
                .map(String::from)
                .collect(),
            ..CleanReport::default()
        };
        if positions.len() != FIELD_COUNT {
            info!(
                matched = positions.len(),
                missing = ?report.missing_columns,
                "header does not map to the required columns; every row will be dropped"
            );
        }

        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(positions.iter().map(|&i| names[i]))?;

        let mut record = csv::StringRecord::new();
        while rdr.read_record(&mut record)? {
            if is_blank(&record) {
                continue;
            }
            report.rows_read += 1;
            match self.project_row(&record, &positions) {
                Ok(fields) => {
                    wtr.write_record(&fields)?;
                    report.rows_written += 1;
                }
                Err(reason) => report.record_drop(reason),
            }
        }
        wtr.flush().map_err(|e| CleanError::Io {
            path: None,
            source: e,
        })?;

        Ok(report)
    }

    fn project_row(
        &self,
        record: &csv::StringRecord,
        positions: &[usize],
    ) -> Result<Vec<String>, DropReason> {
        if positions.len() != FIELD_COUNT {
            return Err(DropReason::FieldCount);
        }
        positions
            .iter()
            .map(|&i| {
                let raw = record.get(i).unwrap_or("");
                if self.schema.is_placeholder(raw) {
                    return Err(DropReason::Placeholder);
                }
                let value = raw.replace(',', "");
                if value.is_empty() {
                    return Err(DropReason::MissingField);
                }
                Ok(value)
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("I/O error{}: {source}", display_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV{}: {source}", display_path(.path))]
    Csv {
        path: Option<PathBuf>,
        #[source]
        source: csv::Error,
    },

    #[error("no header row{}", display_path(.path))]
    MissingHeader { path: Option<PathBuf> },

    #[error("cleaned file already exists: {}", .path.display())]
    OutputExists { path: PathBuf },
}

impl CleanError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.to_path_buf()),
            source,
        }
    }

    /// Attach `path` to errors raised without one.
    fn with_path(self, at: &Path) -> Self {
        match self {
            Self::Io { path: None, source } => Self::io(at, source),
            Self::Csv { path: None, source } => Self::Csv {
                path: Some(at.to_path_buf()),
                source,
            },
            Self::MissingHeader { path: None } => Self::MissingHeader {
                path: Some(at.to_path_buf()),
            },
            other => other,
        }
    }
}

impl From<csv::Error> for CleanError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { path: None, source }
    }
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.get(0).map_or(true, str::is_empty)
}

pub(crate) fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}
