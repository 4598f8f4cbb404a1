#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{
    bigquery::{
        loader::{LoadJobClient, LoadJobOutcome},
        table::{TableRef, WriteDisposition},
    },
    error::{DestinationError, SourceError},
    sql::source::SqlSource,
};
use model::records::row::RowData;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Everything the in-memory source observed during a run.
#[derive(Debug, Default)]
pub struct SourceJournal {
    pub count_queries: Vec<String>,
    pub page_queries: Vec<String>,
    pub reads: Vec<(u64, u64)>,
    pub reconnects: usize,
    pub closed: bool,
}

/// SQL Server stand-in that serves rows by parsing the page query's
/// `OFFSET … FETCH NEXT …` clause.
pub struct MemorySource {
    rows: Vec<RowData>,
    // offset -> number of rows to return instead of the natural slice
    page_sizes: HashMap<u64, usize>,
    fail_read_at: Option<u64>,
    journal: Arc<Mutex<SourceJournal>>,
}

impl MemorySource {
    pub fn new(rows: Vec<RowData>) -> Self {
        MemorySource {
            rows,
            page_sizes: HashMap::new(),
            fail_read_at: None,
            journal: Arc::new(Mutex::new(SourceJournal::default())),
        }
    }

    /// Returns only `rows` rows for the page starting at `offset`.
    pub fn with_page_size(mut self, offset: u64, rows: usize) -> Self {
        self.page_sizes.insert(offset, rows);
        self
    }

    pub fn failing_read_at(mut self, offset: u64) -> Self {
        self.fail_read_at = Some(offset);
        self
    }

    pub fn journal(&self) -> Arc<Mutex<SourceJournal>> {
        self.journal.clone()
    }
}

fn parse_window(sql: &str) -> (u64, u64) {
    let words: Vec<&str> = sql.split_whitespace().collect();
    let number_after = |keyword: &str| -> u64 {
        words
            .iter()
            .position(|w| *w == keyword)
            .and_then(|i| words.get(i + 1))
            .and_then(|w| w.parse().ok())
            .unwrap_or_else(|| panic!("no {keyword} clause in `{sql}`"))
    };
    (number_after("OFFSET"), number_after("NEXT"))
}

#[async_trait]
impl SqlSource for MemorySource {
    async fn query_count(&mut self, sql: &str) -> Result<u64, SourceError> {
        self.journal.lock().unwrap().count_queries.push(sql.to_string());
        Ok(self.rows.len() as u64)
    }

    async fn query_rows(&mut self, sql: &str) -> Result<Vec<RowData>, SourceError> {
        let (offset, limit) = parse_window(sql);
        {
            let mut journal = self.journal.lock().unwrap();
            journal.page_queries.push(sql.to_string());
            journal.reads.push((offset, limit));
        }

        if self.fail_read_at == Some(offset) {
            return Err(SourceError::query(
                sql,
                "TCP Provider: An existing connection was forcibly closed",
            ));
        }

        let take = self
            .page_sizes
            .get(&offset)
            .copied()
            .unwrap_or(limit as usize);

        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(take.min(limit as usize))
            .cloned()
            .collect())
    }

    async fn reconnect(&mut self) -> Result<(), SourceError> {
        self.journal.lock().unwrap().reconnects += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        self.journal.lock().unwrap().closed = true;
        Ok(())
    }

    fn endpoint(&self) -> String {
        "mock-server:1433/mock-db".into()
    }
}

/// One load job as the warehouse saw it.
#[derive(Debug, Clone)]
pub struct LoadRecord {
    pub path: PathBuf,
    pub table: String,
    pub disposition: WriteDisposition,
    pub file_existed: bool,
    pub rows_in_file: i64,
}

/// BigQuery stand-in that inspects each staged file while the job "runs".
#[derive(Default)]
pub struct RecordingLoader {
    records: Mutex<Vec<LoadRecord>>,
    fail_on_call: Option<usize>,
}

impl RecordingLoader {
    pub fn failing_on_call(call: usize) -> Self {
        RecordingLoader {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<LoadRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn dispositions(&self) -> Vec<WriteDisposition> {
        self.records().iter().map(|r| r.disposition).collect()
    }
}

#[async_trait]
impl LoadJobClient for RecordingLoader {
    async fn load_parquet(
        &self,
        path: &Path,
        table: &TableRef,
        disposition: WriteDisposition,
    ) -> Result<LoadJobOutcome, DestinationError> {
        let file_existed = path.exists();
        let rows_in_file = if file_existed { parquet_row_count(path) } else { 0 };

        let call = {
            let mut records = self.records.lock().unwrap();
            records.push(LoadRecord {
                path: path.to_path_buf(),
                table: table.to_string(),
                disposition,
                file_existed,
                rows_in_file,
            });
            records.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(DestinationError::JobFailed {
                job_id: format!("job_{call}"),
                message: "invalid: Provided Schema does not match Table".into(),
            });
        }

        Ok(LoadJobOutcome {
            job_id: format!("job_{call}"),
            output_rows: Some(rows_in_file as u64),
        })
    }
}

pub fn parquet_row_count(path: &Path) -> i64 {
    let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
    reader.metadata().file_metadata().num_rows()
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
