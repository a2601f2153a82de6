//! Data stages: folder ingestion, CSV cleaning, record validation.

pub mod clean;
pub mod ingest;
pub mod schema;
pub mod validate;

pub use clean::{CleanError, CleanOutput, CleanReport, Cleaner, OverwritePolicy, DEFAULT_OUTPUT_DIR};
pub use ingest::{IngestError, Ingestor, StockFile, StockFiles};
pub use schema::{ColumnSchema, SchemaError, PLACEHOLDERS, REQUIRED_COLUMNS};
pub use validate::{ValidateError, Validated, ValidationReport, Validator};
