use crate::error::SourceError;
use async_trait::async_trait;
use model::records::row::RowData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Query-execution capability of the relational source. Implementations own
/// one long-lived connection; callers issue parameterless SQL text.
#[async_trait]
pub trait SqlSource: Send {
    /// Runs a query whose first row's first column is a row count.
    async fn query_count(&mut self, sql: &str) -> Result<u64, SourceError>;

    /// Runs a query and materializes its first result set.
    async fn query_rows(&mut self, sql: &str) -> Result<Vec<RowData>, SourceError>;

    /// Drops the current connection and opens a fresh one.
    async fn reconnect(&mut self) -> Result<(), SourceError>;

    /// Releases the connection. Further queries fail.
    async fn close(&mut self) -> Result<(), SourceError>;

    /// Loggable description of the endpoint (no credentials).
    fn endpoint(&self) -> String;
}

/// One source connection shared by the row-count resolver and the chunk
/// reader for the lifetime of a run.
pub type SharedSource<S> = Arc<Mutex<S>>;

pub fn shared<S: SqlSource>(source: S) -> SharedSource<S> {
    Arc::new(Mutex::new(source))
}
