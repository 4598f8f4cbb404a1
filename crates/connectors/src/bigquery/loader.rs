use crate::{
    bigquery::table::{TableRef, WriteDisposition},
    error::DestinationError,
};
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobOutcome {
    pub job_id: String,
    pub output_rows: Option<u64>,
}

/// Bulk-load capability of the warehouse.
#[async_trait]
pub trait LoadJobClient: Send + Sync {
    /// Loads a Parquet file into `table` with an autodetected schema and
    /// waits until the job has finished. A failed job is an error carrying
    /// the job's diagnostic message.
    async fn load_parquet(
        &self,
        path: &Path,
        table: &TableRef,
        disposition: WriteDisposition,
    ) -> Result<LoadJobOutcome, DestinationError>;
}
