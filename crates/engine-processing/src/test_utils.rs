use async_trait::async_trait;
use connectors::{
    bigquery::{
        loader::{LoadJobClient, LoadJobOutcome},
        table::{TableRef, WriteDisposition},
    },
    error::{DestinationError, SourceError},
    sql::source::SqlSource,
};
use engine_config::settings::{transfer::TransferConfig, write_mode::WriteMode};
use model::{
    core::value::Value,
    execution::connection::{DestinationLocator, SourceAuth, SourceLocator, SourceSelection},
    records::row::RowData,
};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

pub fn rows(n: usize) -> Vec<RowData> {
    (0..n)
        .map(|i| {
            RowData::from_iter([
                ("id".to_string(), Value::Int(i as i64)),
                ("name".to_string(), Value::String(format!("row-{i}"))),
            ])
        })
        .collect()
}

pub fn config(selection: SourceSelection, staging_dir: &Path) -> TransferConfig {
    let source = SourceLocator {
        host: "localhost".into(),
        port: 1433,
        database: "sales".into(),
        selection,
        auth: SourceAuth::SqlServer {
            username: "sa".into(),
            password: "pw".into(),
        },
        trust_cert: true,
    };
    let destination = DestinationLocator {
        project: "acme".into(),
        dataset: "warehouse".into(),
        table: "orders".into(),
        credentials_path: PathBuf::from("key.json"),
    };

    TransferConfig::new(source, destination, 25, WriteMode::TruncateAppend)
        .unwrap()
        .with_staging_dir(staging_dir.to_path_buf())
        .unwrap()
}

/// Source that answers from fixed data and records every statement.
#[derive(Default)]
pub struct FakeSource {
    pub count: u64,
    pub rows: Vec<RowData>,
    pub fail_reads: usize,
    pub undecodable: bool,
    pub fail_reconnect: bool,
    pub statements: Vec<String>,
    pub reconnects: usize,
}

#[async_trait]
impl SqlSource for FakeSource {
    async fn query_count(&mut self, sql: &str) -> Result<u64, SourceError> {
        self.statements.push(sql.to_string());
        Ok(self.count)
    }

    async fn query_rows(&mut self, sql: &str) -> Result<Vec<RowData>, SourceError> {
        self.statements.push(sql.to_string());
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(SourceError::query(sql, "connection reset by peer"));
        }
        if self.undecodable {
            return Err(SourceError::Decode {
                column: "geo".into(),
                message: "unsupported column type Udt".into(),
            });
        }
        let (offset, limit) = window_of(sql);
        Ok(self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn reconnect(&mut self) -> Result<(), SourceError> {
        self.reconnects += 1;
        if self.fail_reconnect {
            return Err(SourceError::connection("localhost:1433/sales", "refused"));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn endpoint(&self) -> String {
        "localhost:1433/sales".into()
    }
}

fn window_of(sql: &str) -> (usize, usize) {
    let words: Vec<&str> = sql.split_whitespace().collect();
    let after = |keyword: &str| {
        words
            .iter()
            .position(|w| *w == keyword)
            .and_then(|i| words.get(i + 1))
            .and_then(|w| w.parse::<usize>().ok())
            .unwrap_or(0)
    };
    (after("OFFSET"), after("NEXT"))
}

#[derive(Debug, Clone)]
pub struct LoadCall {
    pub path: PathBuf,
    pub disposition: WriteDisposition,
    pub file_existed: bool,
}

/// Loader that records each call instead of talking to a warehouse.
#[derive(Default)]
pub struct RecordingLoader {
    pub calls: Mutex<Vec<LoadCall>>,
    pub fail: bool,
}

impl RecordingLoader {
    pub fn calls(&self) -> Vec<LoadCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoadJobClient for RecordingLoader {
    async fn load_parquet(
        &self,
        path: &Path,
        _table: &TableRef,
        disposition: WriteDisposition,
    ) -> Result<LoadJobOutcome, DestinationError> {
        self.calls.lock().unwrap().push(LoadCall {
            path: path.to_path_buf(),
            disposition,
            file_existed: path.exists(),
        });

        if self.fail {
            return Err(DestinationError::JobFailed {
                job_id: "job_1".into(),
                message: "invalid: Schema mismatch".into(),
            });
        }

        Ok(LoadJobOutcome {
            job_id: "job_1".into(),
            output_rows: None,
        })
    }
}
