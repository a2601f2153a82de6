//! Cleaned and validated OHLCV records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fields in a cleaned record: date, open, high, low, close, volume.
pub const FIELD_COUNT: usize = 6;

/// One cleaned row: exactly six non-empty text fields.
///
/// Fields are positional. The Validator reads them as
/// `[date, open, high, low, close, volume]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord([String; FIELD_COUNT]);

impl CleanRecord {
    pub fn fields(&self) -> &[String; FIELD_COUNT] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for CleanRecord {
    type Error = RecordError;

    fn try_from(fields: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(position) = fields.iter().position(|f| f.is_empty()) {
            return Err(RecordError::EmptyField { position });
        }
        let found = fields.len();
        let fields: [String; FIELD_COUNT] = fields
            .try_into()
            .map_err(|_| RecordError::FieldCount { found })?;
        Ok(Self(fields))
    }
}

/// A cleaned record whose fields have been converted to their semantic types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// Kept verbatim from the cleaned row.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl ValidatedRecord {
    /// Convert every field of `record`, failing on the first field that does
    /// not parse.
    ///
    /// Prices must be finite decimals; volume must be a non-negative integer.
    /// Surrounding ASCII whitespace is ignored for numeric fields.
    pub fn parse(record: &CleanRecord) -> Result<Self, RecordError> {
        let [date, open, high, low, close, volume] = record.fields();
        Ok(Self {
            date: date.clone(),
            open: parse_decimal(open, 1)?,
            high: parse_decimal(high, 2)?,
            low: parse_decimal(low, 3)?,
            close: parse_decimal(close, 4)?,
            volume: parse_volume(volume, 5)?,
        })
    }
}

fn parse_decimal(raw: &str, position: usize) -> Result<f64, RecordError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(RecordError::Unparsable { position })
}

fn parse_volume(raw: &str, position: usize) -> Result<u64, RecordError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RecordError::Unparsable { position })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {} fields, found {found}", FIELD_COUNT)]
    FieldCount { found: usize },

    #[error("field {position} is empty")]
    EmptyField { position: usize },

    #[error("field {position} does not parse")]
    Unparsable { position: usize },
}
