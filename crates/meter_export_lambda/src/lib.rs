//! AWS-oriented adapters and handlers for the meter export job.
//!
//! This crate owns runtime integration details (the Lambda handler, the table
//! and object store seams, and error surfacing). Parsing and CSV assembly live
//! in `meter_export_core`.

pub mod adapters;
pub mod error;
pub mod handlers;
