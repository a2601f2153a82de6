//! rsiscan core: ingestion, cleaning, validation and the RSI indicator.
//!
//! Stages, each feeding the next:
//! - Ingestor: list a folder, keep `*.csv`, name the stock from the filename
//! - Cleaner: project onto the required columns, drop incomplete rows,
//!   write `<stock>_<date>.csv`
//! - Validator: re-read the cleaned file into typed records
//! - Indicator engine: gains/losses from closes, first-window RSI

pub mod data;
pub mod domain;
pub mod indicators;
