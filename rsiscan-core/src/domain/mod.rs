//! Domain types for rsiscan

pub mod record;
pub mod stock;

pub use record::{CleanRecord, RecordError, ValidatedRecord, FIELD_COUNT};
pub use stock::{FileNameError, StockId};
