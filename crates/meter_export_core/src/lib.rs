//! Shared meter export domain primitives.
//!
//! This crate owns record decoding, reading extraction, and CSV document
//! assembly. It intentionally excludes AWS SDK and Lambda runtime concerns,
//! which live in `meter_export_lambda`.

pub mod config;
pub mod document;
pub mod parser;
pub mod record;

pub use config::ExportConfig;
pub use document::{ExportDocument, ExportRow, EXPORT_HEADER};
pub use parser::{decode_blob, parse_blob, parse_reading, ParsedReading, UNDECODABLE_SENTINEL};
pub use record::{MeterRecord, RawBlob};
