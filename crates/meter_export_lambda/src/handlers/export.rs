use std::time::Instant;

use meter_export_core::{ExportConfig, ExportDocument};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::adapters::object_store::ObjectStore;
use crate::adapters::record_source::RecordSource;
use crate::error::ExportError;

pub const EXPORT_SUCCESS_MESSAGE: &str = "Data transformation and upload to S3 successful.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ExportResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: EXPORT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Scans the source table once, renders every record as a CSV row, and
/// overwrites the export object.
pub fn handle_export(
    config: &ExportConfig,
    source: &impl RecordSource,
    store: &impl ObjectStore,
) -> Result<ExportResponse, ExportError> {
    let started_at = Instant::now();
    info!(
        event = "export_started",
        table = %config.table_name,
        bucket = %config.bucket,
        object_key = %config.object_key
    );

    match run_export(config, source, store) {
        Ok(summary) => {
            info!(
                event = "export_completed",
                rows = summary.rows,
                bytes = summary.bytes,
                duration_ms = started_at.elapsed().as_millis() as u64,
                object_key = %config.object_key
            );
            Ok(ExportResponse::success())
        }
        Err(export_error) => {
            error!(
                event = "export_failed",
                duration_ms = started_at.elapsed().as_millis() as u64,
                error = %export_error
            );
            Err(export_error)
        }
    }
}

struct ExportSummary {
    rows: usize,
    bytes: usize,
}

fn run_export(
    config: &ExportConfig,
    source: &impl RecordSource,
    store: &impl ObjectStore,
) -> Result<ExportSummary, ExportError> {
    let page = source
        .scan_table(&config.table_name)
        .map_err(|message| ExportError::SourceRead {
            table: config.table_name.clone(),
            message,
        })?;

    if page.truncated {
        warn!(
            event = "scan_truncated",
            table = %config.table_name,
            records = page.records.len(),
            "table has more items than a single scan returns; exporting the first page only"
        );
    }

    let document = ExportDocument::from_records(&page.records);
    let body = document.render()?;

    store
        .write_object(&config.object_key, &body)
        .map_err(|message| ExportError::ObjectWrite {
            key: config.object_key.clone(),
            message,
        })?;

    Ok(ExportSummary {
        rows: document.len(),
        bytes: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    use meter_export_core::{MeterRecord, RawBlob};
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::adapters::record_source::ScanPage;

    const HEADER_LINE: &str = "DATA:,Timestamp,FLOW RATE (m3/h),Daily Usage (m3)\r\n";

    struct RecordingStore {
        writes: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                writes: Mutex::new(HashMap::new()),
            }
        }

        fn keys(&self) -> Vec<String> {
            self.writes
                .lock()
                .expect("poisoned mutex")
                .keys()
                .cloned()
                .collect()
        }

        fn body(&self, key: &str) -> Option<Vec<u8>> {
            self.writes
                .lock()
                .expect("poisoned mutex")
                .get(key)
                .cloned()
        }

        fn seed_object(&self, key: &str, body: &[u8]) {
            self.writes
                .lock()
                .expect("poisoned mutex")
                .insert(key.to_string(), body.to_vec());
        }
    }

    impl ObjectStore for RecordingStore {
        fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
            self.writes
                .lock()
                .expect("poisoned mutex")
                .insert(key.to_string(), body.to_vec());
            Ok(())
        }
    }

    struct DeniedStore;

    impl ObjectStore for DeniedStore {
        fn write_object(&self, key: &str, _body: &[u8]) -> Result<(), String> {
            Err(format!("simulated write failure for key: {key}"))
        }
    }

    struct StaticSource {
        page: ScanPage,
        scanned_tables: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn new(records: Vec<MeterRecord>) -> Self {
            Self {
                page: ScanPage {
                    records,
                    truncated: false,
                },
                scanned_tables: Mutex::new(Vec::new()),
            }
        }

        fn truncated(records: Vec<MeterRecord>) -> Self {
            let mut source = Self::new(records);
            source.page.truncated = true;
            source
        }

        fn scanned_tables(&self) -> Vec<String> {
            self.scanned_tables.lock().expect("poisoned mutex").clone()
        }
    }

    impl RecordSource for StaticSource {
        fn scan_table(&self, table_name: &str) -> Result<ScanPage, String> {
            self.scanned_tables
                .lock()
                .expect("poisoned mutex")
                .push(table_name.to_string());
            Ok(self.page.clone())
        }
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn scan_table(&self, _table_name: &str) -> Result<ScanPage, String> {
            Err("ResourceNotFoundException: table missing".to_string())
        }
    }

    fn sample_records() -> Vec<MeterRecord> {
        vec![
            MeterRecord::new(
                "WATER METER 01",
                "1725545521",
                b"05-09-24 14:22:01 FLOW: 1.25 m3/h TODAY 3.40 m3".as_slice(),
            ),
            MeterRecord::new("WATER METER 02", "1725545581", RawBlob::Undecodable),
        ]
    }

    fn sample_config() -> ExportConfig {
        ExportConfig {
            table_name: "WATER-USUAGE".to_string(),
            bucket: "local-bucket".to_string(),
            object_key: "transformed_data/09/04/transformed_data.csv".to_string(),
        }
    }

    #[test]
    fn export_writes_csv_to_configured_key() {
        let store = RecordingStore::new();
        let source = StaticSource::new(sample_records());
        let config = sample_config();

        let response = handle_export(&config, &source, &store).expect("export should succeed");

        assert_eq!(response, ExportResponse::success());
        assert_eq!(source.scanned_tables(), vec!["WATER-USUAGE".to_string()]);
        assert_eq!(store.keys(), vec![config.object_key.clone()]);

        let body = store.body(&config.object_key).expect("export should exist");
        assert_eq!(
            String::from_utf8(body).expect("export should be utf-8"),
            format!(
                "{HEADER_LINE}WATER METER 01,05-09-24 14:22:01,1.25,3.40\r\nWATER METER 02,,,\r\n"
            )
        );
    }

    #[test]
    fn stored_object_matches_rendered_document_byte_for_byte() {
        let store = RecordingStore::new();
        let records = sample_records();
        let config = sample_config();

        handle_export(&config, &StaticSource::new(records.clone()), &store)
            .expect("export should succeed");

        let expected = ExportDocument::from_records(&records)
            .render()
            .expect("document should render");
        assert_eq!(store.body(&config.object_key), Some(expected));
    }

    #[test]
    fn empty_table_exports_header_only() {
        let store = RecordingStore::new();
        let config = sample_config();

        handle_export(&config, &StaticSource::new(Vec::new()), &store)
            .expect("export should succeed");

        assert_eq!(
            store.body(&config.object_key),
            Some(HEADER_LINE.as_bytes().to_vec())
        );
    }

    #[test]
    fn export_overwrites_previous_object() {
        let store = RecordingStore::new();
        let config = sample_config();
        store.seed_object(&config.object_key, b"stale export");

        handle_export(&config, &StaticSource::new(Vec::new()), &store)
            .expect("export should succeed");

        assert_eq!(store.keys().len(), 1);
        assert_eq!(
            store.body(&config.object_key),
            Some(HEADER_LINE.as_bytes().to_vec())
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.buffer.lock().expect("poisoned mutex").clone())
                .expect("log output should be utf-8")
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buffer
                .lock()
                .expect("poisoned mutex")
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn export_with_captured_logs(source: &StaticSource, store: &RecordingStore) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            handle_export(&sample_config(), source, store).expect("export should succeed")
        });
        logs.text()
    }

    #[test]
    fn truncated_scan_warns_and_exports_first_page() {
        let store = RecordingStore::new();
        let source = StaticSource::truncated(sample_records());

        let logs = export_with_captured_logs(&source, &store);

        let warning = logs
            .lines()
            .find(|line| line.contains("scan_truncated"))
            .expect("truncation warning should be logged");
        assert!(warning.contains("WARN"));
        assert!(warning.contains("records=2"));

        let body = store
            .body(&sample_config().object_key)
            .expect("export should exist");
        let text = String::from_utf8(body).expect("export should be utf-8");
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn complete_scan_does_not_warn() {
        let store = RecordingStore::new();
        let source = StaticSource::new(sample_records());

        let logs = export_with_captured_logs(&source, &store);

        assert!(!logs.contains("scan_truncated"));
        assert!(logs.contains("export_completed"));
    }

    #[test]
    fn source_failure_propagates_without_writing() {
        let store = RecordingStore::new();

        let error = handle_export(&sample_config(), &FailingSource, &store)
            .expect_err("scan failure should propagate");

        assert!(matches!(
            error,
            ExportError::SourceRead { ref table, .. } if table == "WATER-USUAGE"
        ));
        assert!(error.to_string().contains("ResourceNotFoundException"));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn store_failure_propagates() {
        let error = handle_export(
            &sample_config(),
            &StaticSource::new(sample_records()),
            &DeniedStore,
        )
        .expect_err("write failure should propagate");

        assert!(matches!(error, ExportError::ObjectWrite { .. }));
        assert!(error.to_string().contains(
            "simulated write failure for key: transformed_data/09/04/transformed_data.csv"
        ));
    }

    #[test]
    fn success_response_serializes_lambda_shape() {
        let value = serde_json::to_value(ExportResponse::success()).expect("response serializes");

        assert_eq!(
            value,
            serde_json::json!({
                "statusCode": 200,
                "body": "Data transformation and upload to S3 successful."
            })
        );
    }
}
