//! Best-effort extraction of meter readings from raw text blobs.
//!
//! Each field is searched for independently. A field that cannot be found is
//! left empty; nothing here ever rejects a record.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::RawBlob;

/// Text substituted for a blob that could not be decoded.
pub const UNDECODABLE_SENTINEL: &str = "Unable to decode";

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("timestamp pattern should compile")
});

static FLOW_RATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FLOW: ([\d.]+) m3/h").expect("flow rate pattern should compile")
});

static DAILY_USAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TODAY ([\d.]+) m3").expect("daily usage pattern should compile")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReading {
    /// `DD-MM-YY HH:MM:SS` as printed by the meter.
    pub timestamp: String,
    /// Instantaneous flow in m3/h.
    pub flow_rate: String,
    /// Cumulative usage for the current day in m3.
    pub daily_usage: String,
}

/// Decodes a blob as latin-1, one byte per char.
pub fn decode_blob(blob: &RawBlob) -> Cow<'_, str> {
    match blob {
        RawBlob::Bytes(bytes) => Cow::Owned(bytes.iter().map(|&byte| char::from(byte)).collect()),
        RawBlob::Undecodable => Cow::Borrowed(UNDECODABLE_SENTINEL),
    }
}

pub fn parse_reading(text: &str) -> ParsedReading {
    ParsedReading {
        timestamp: first_capture(&TIMESTAMP_PATTERN, text),
        flow_rate: first_capture(&FLOW_RATE_PATTERN, text),
        daily_usage: first_capture(&DAILY_USAGE_PATTERN, text),
    }
}

pub fn parse_blob(blob: &RawBlob) -> ParsedReading {
    parse_reading(&decode_blob(blob))
}

fn first_capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_default()
}
