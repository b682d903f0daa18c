use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use meter_export_core::record::{CONSUMPTION_RAW_ATTRIBUTE, LABEL_ATTRIBUTE, TIME_ATTRIBUTE};
use meter_export_core::{ExportConfig, MeterRecord, RawBlob};
use meter_export_lambda::adapters::object_store::ObjectStore;
use meter_export_lambda::adapters::record_source::{RecordSource, ScanPage};
use meter_export_lambda::handlers::export::{handle_export, ExportResponse};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

struct DynamoDbRecordSource {
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl RecordSource for DynamoDbRecordSource {
    fn scan_table(&self, table_name: &str) -> Result<ScanPage, String> {
        let client = self.dynamodb_client.clone();
        let table = table_name.to_string();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .scan()
                    .table_name(table)
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to scan dynamodb table: {}",
                            aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })?;

        Ok(ScanPage {
            records: output.items().iter().map(meter_record_from_item).collect(),
            truncated: output
                .last_evaluated_key()
                .is_some_and(|key| !key.is_empty()),
        })
    }
}

struct S3ObjectStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type("text/csv")
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to write object to s3: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

fn meter_record_from_item(item: &HashMap<String, AttributeValue>) -> MeterRecord {
    let label = item
        .get(LABEL_ATTRIBUTE)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .unwrap_or_default();
    let time = item
        .get(TIME_ATTRIBUTE)
        .and_then(|value| value.as_n().ok())
        .cloned()
        .unwrap_or_default();
    let consumption_raw = match item.get(CONSUMPTION_RAW_ATTRIBUTE) {
        None => RawBlob::default(),
        Some(AttributeValue::B(blob)) => RawBlob::Bytes(blob.as_ref().to_vec()),
        Some(_) => RawBlob::Undecodable,
    };

    MeterRecord {
        label,
        time,
        consumption_raw,
    }
}

#[derive(Clone)]
struct RuntimeDependencies {
    config: ExportConfig,
    dynamodb_client: aws_sdk_dynamodb::Client,
    s3_client: aws_sdk_s3::Client,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: RuntimeDependencies,
) -> Result<ExportResponse, Error> {
    tracing::info!(event = "invocation_received", request_id = %event.context.request_id);

    let source = DynamoDbRecordSource {
        dynamodb_client: deps.dynamodb_client,
    };
    let store = S3ObjectStore {
        bucket: deps.config.bucket.clone(),
        s3_client: deps.s3_client,
    };

    handle_export(&deps.config, &source, &store).map_err(Error::from)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        // CloudWatch already prefixes every line with the ingestion time.
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        config: ExportConfig::from_env(),
        dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        handle_request(event, deps.clone())
    }))
    .await
}
