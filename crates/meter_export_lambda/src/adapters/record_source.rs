use meter_export_core::MeterRecord;

/// Result of a single, unpaginated table read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub records: Vec<MeterRecord>,
    /// The store reported more items than it returned in this page.
    pub truncated: bool,
}

pub trait RecordSource {
    fn scan_table(&self, table_name: &str) -> Result<ScanPage, String>;
}
