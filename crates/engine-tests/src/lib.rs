#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use engine_config::settings::{transfer::TransferConfig, write_mode::WriteMode};
use model::{
    core::value::Value,
    execution::connection::{
        DEFAULT_SQL_SERVER_PORT, DestinationLocator, SourceAuth, SourceLocator, SourceSelection,
    },
    records::row::RowData,
};
use std::path::{Path, PathBuf};

pub mod engine;
pub mod utils;

const SOURCE_TABLE: &str = "dbo.orders";
const BQ_PROJECT: &str = "test-project";
const BQ_DATASET: &str = "test_dataset";
const BQ_TABLE: &str = "orders";

/// One row shaped like a typical orders table.
pub fn order_row(id: u64) -> RowData {
    let placed = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.checked_add_days(chrono::Days::new(id % 365)))
        .unwrap();

    RowData::from_iter([
        ("id".to_string(), Value::Int(id as i64)),
        ("customer".to_string(), Value::String(format!("customer-{}", id % 7))),
        (
            "total".to_string(),
            Value::Decimal {
                unscaled: (id as i128) * 125,
                scale: 2,
            },
        ),
        ("placed_on".to_string(), Value::Date(placed)),
        (
            "updated_at".to_string(),
            Value::Timestamp(Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap()),
        ),
        (
            "note".to_string(),
            if id % 3 == 0 {
                Value::Null
            } else {
                Value::String("ok".into())
            },
        ),
    ])
}

pub fn order_rows(n: u64) -> Vec<RowData> {
    (0..n).map(order_row).collect()
}

pub fn transfer_config(
    selection: SourceSelection,
    chunk_size: u64,
    total_rows: Option<u64>,
    write_mode: WriteMode,
    staging_dir: &Path,
) -> TransferConfig {
    let source = SourceLocator {
        host: "mock-server".into(),
        port: DEFAULT_SQL_SERVER_PORT,
        database: "mock-db".into(),
        selection,
        auth: SourceAuth::SqlServer {
            username: "test-user".into(),
            password: "test-pass".into(),
        },
        trust_cert: true,
    };
    let destination = DestinationLocator {
        project: BQ_PROJECT.into(),
        dataset: BQ_DATASET.into(),
        table: BQ_TABLE.into(),
        credentials_path: PathBuf::from("key.json"),
    };

    TransferConfig::new(source, destination, chunk_size, write_mode)
        .expect("valid config")
        .with_total_rows(total_rows)
        .with_staging_dir(staging_dir.to_path_buf())
        .expect("valid staging dir")
}

pub fn table_config(chunk_size: u64, staging_dir: &Path) -> TransferConfig {
    transfer_config(
        SourceSelection::Table(SOURCE_TABLE.into()),
        chunk_size,
        None,
        WriteMode::TruncateAppend,
        staging_dir,
    )
}
