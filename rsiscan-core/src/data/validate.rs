//! Validator: re-read a cleaned file and convert fields to typed records.
//!
//! The header row is skipped unconditionally. Each data row either converts
//! completely into a `ValidatedRecord` or is rejected as a whole; rejections
//! are counted in a `ValidationReport`, never returned as errors.

use crate::data::clean::display_path;
use crate::domain::record::{CleanRecord, RecordError, ValidatedRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Row counters for one validated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows_read: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    /// Rows whose field count was not six, or that held an empty field.
    pub rejected_shape: usize,
    /// Rejections keyed by the cleaned header name of the first bad field.
    pub rejected_by_column: BTreeMap<String, usize>,
}

/// Typed records plus the report describing how they were obtained.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    pub records: Vec<ValidatedRecord>,
    pub report: ValidationReport,
}

/// Stateless cleaned-file reader.
pub struct Validator;

impl Validator {
    /// Validate the cleaned file at `path`.
    pub fn validate(path: &Path) -> Result<Validated, ValidateError> {
        let file = File::open(path).map_err(|source| ValidateError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let validated = Self::validate_reader(file).map_err(|e| e.with_path(path))?;
        debug!(
            path = %path.display(),
            accepted = validated.report.rows_accepted,
            rejected = validated.report.rows_rejected,
            "validated cleaned file"
        );
        Ok(validated)
    }

    /// Validate cleaned CSV text from `reader`.
    pub fn validate_reader<R: Read>(reader: R) -> Result<Validated, ValidateError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let header = rdr.headers()?.clone();

        let mut out = Validated::default();
        let mut record = csv::StringRecord::new();
        while rdr.read_record(&mut record)? {
            out.report.rows_read += 1;
            let fields: Vec<String> = record.iter().map(String::from).collect();
            let parsed = CleanRecord::try_from(fields).and_then(|r| ValidatedRecord::parse(&r));
            match parsed {
                Ok(rec) => {
                    out.records.push(rec);
                    out.report.rows_accepted += 1;
                }
                Err(err) => {
                    out.report.rows_rejected += 1;
                    match err {
                        RecordError::Unparsable { position } => {
                            let column = header
                                .get(position)
                                .map(String::from)
                                .unwrap_or_else(|| format!("#{position}"));
                            *out.report.rejected_by_column.entry(column).or_default() += 1;
                        }
                        RecordError::FieldCount { .. } | RecordError::EmptyField { .. } => {
                            out.report.rejected_shape += 1;
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
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
}

impl ValidateError {
    fn with_path(self, at: &Path) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(at.to_path_buf()),
                source,
            },
            Self::Csv { path: None, source } => Self::Csv {
                path: Some(at.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl From<csv::Error> for ValidateError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { path: None, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_str(input: &str) -> Validated {
        Validator::validate_reader(input.as_bytes()).unwrap()
    }

    #[test]
    fn skips_header_and_converts_rows() {
        let v = validate_str(
            "DATE,OPEN,HIGH,LOW,CLOSE,VOLUME\n\
             2024-01-02,10,11,9,10.5,100\n\
             2024-01-03,10.5,12,10,1234.56,250\n",
        );
        assert_eq!(v.records.len(), 2);
        assert_eq!(v.records[1].close, 1234.56);
        assert_eq!(v.records[1].volume, 250);
        assert_eq!(v.report.rows_read, 2);
        assert_eq!(v.report.rows_accepted, 2);
    }

    #[test]
    fn header_is_skipped_even_if_numeric() {
        let v = validate_str("d,1,1,1,1,1\nd,2,2,2,2,2\n");
        assert_eq!(v.records.len(), 1);
        assert_eq!(v.records[0].close, 2.0);
    }

    #[test]
    fn rejects_whole_row_on_bad_field() {
        let v = validate_str(
            "DATE,OPEN,HIGH,LOW,CLOSE,VOLUME\n\
             2024-01-02,10,11,9,abc,100\n\
             2024-01-03,10,11,9,10.5,1.5\n\
             2024-01-04,10,11,9,10.5,100\n",
        );
        assert_eq!(v.records.len(), 1);
        assert_eq!(v.records[0].date, "2024-01-04");
        assert_eq!(v.report.rows_rejected, 2);
        assert_eq!(v.report.rejected_by_column.get("CLOSE"), Some(&1));
        assert_eq!(v.report.rejected_by_column.get("VOLUME"), Some(&1));
    }

    #[test]
    fn rejects_rows_of_wrong_width() {
        let v = validate_str(
            "DATE,OPEN,HIGH,LOW,CLOSE,VOLUME\n\
             2024-01-02,10,11,9,10.5\n\
             2024-01-03,10,11,9,10.5,100,7\n",
        );
        assert!(v.records.is_empty());
        assert_eq!(v.report.rejected_shape, 2);
    }

    #[test]
    fn empty_file_yields_no_records() {
        let v = validate_str("");
        assert!(v.records.is_empty());
        assert_eq!(v.report, ValidationReport::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Validator::validate(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ValidateError::Io { path: Some(_), .. }));
    }
}
