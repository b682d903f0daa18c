use std::io;

use crate::parser::parse_blob;
use crate::record::MeterRecord;

pub const EXPORT_HEADER: [&str; 4] = [
    "DATA:",
    "Timestamp",
    "FLOW RATE (m3/h)",
    "Daily Usage (m3)",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRow {
    pub label: String,
    pub timestamp: String,
    pub flow_rate: String,
    pub daily_usage: String,
}

impl ExportRow {
    /// Builds the row for one record. The record's `time` is not exported.
    pub fn from_record(record: &MeterRecord) -> Self {
        let reading = parse_blob(&record.consumption_raw);
        Self {
            label: record.label.clone(),
            timestamp: reading.timestamp,
            flow_rate: reading.flow_rate,
            daily_usage: reading.daily_usage,
        }
    }

    fn fields(&self) -> [&str; 4] {
        [
            self.label.as_str(),
            self.timestamp.as_str(),
            self.flow_rate.as_str(),
            self.daily_usage.as_str(),
        ]
    }
}

/// The complete CSV export: header plus one row per source record, in source
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportDocument {
    rows: Vec<ExportRow>,
}

impl ExportDocument {
    pub fn from_records(records: &[MeterRecord]) -> Self {
        Self {
            rows: records.iter().map(ExportRow::from_record).collect(),
        }
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the document as CRLF-terminated CSV with minimal quoting.
    pub fn render(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());

        wtr.write_record(EXPORT_HEADER)?;
        for row in &self.rows {
            wtr.write_record(row.fields())?;
        }

        wtr.flush()?;
        wtr.into_inner()
            .map_err(|error| csv::Error::from(io::Error::other(error.to_string())))
    }
}
