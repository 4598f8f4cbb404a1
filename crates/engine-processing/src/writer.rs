use crate::{error::TransferError, staging::StagingFile};
use connectors::{
    bigquery::{
        loader::LoadJobClient,
        table::{TableRef, WriteDisposition},
    },
    error::DestinationError,
    staging::writer::{to_record_batch, write_batch},
};
use engine_config::settings::{transfer::TransferConfig, write_mode::WriteMode};
use engine_core::{metrics::megabytes, retry::RetryPolicy};
use model::records::batch::Page;
use std::{path::PathBuf, sync::Arc};
use tracing::{Instrument, Span, debug, info};

/// What a committed chunk produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenChunk {
    pub rows: u64,
    pub staged_bytes: u64,
    pub disposition: WriteDisposition,
    pub job_id: String,
}

/// Stages pages as Parquet and commits them with a load job.
pub struct ChunkWriter {
    loader: Arc<dyn LoadJobClient>,
    table: TableRef,
    staging_dir: PathBuf,
    cleanup: RetryPolicy,
    span: Span,
}

impl ChunkWriter {
    pub fn new(loader: Arc<dyn LoadJobClient>, config: &TransferConfig) -> Self {
        ChunkWriter {
            loader,
            table: config.table_ref(),
            staging_dir: config.staging_dir().clone(),
            cleanup: RetryPolicy::for_cleanup(),
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_cleanup_policy(mut self, policy: RetryPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    /// Commits `page` to the destination table. An empty page is a no-op
    /// and returns `None`.
    ///
    /// The staging file is removed on every path out of this call,
    /// including a failed load.
    pub async fn write_chunk(
        &self,
        page: &Page,
        is_first_chunk: bool,
        write_mode: WriteMode,
    ) -> Result<Option<WrittenChunk>, TransferError> {
        if page.is_empty() {
            debug!(parent: &self.span, offset = page.window.offset, "Empty page, nothing to load");
            return Ok(None);
        }

        let disposition = write_mode.disposition(is_first_chunk);

        async {
            let staging = StagingFile::new_in(&self.staging_dir).with_retry(self.cleanup.clone());
            let result = self.stage_and_load(page, &staging, disposition).await;
            staging.remove().await;

            let chunk = result.map_err(|source| TransferError::Write {
                offset: page.window.offset,
                source,
            })?;

            info!(
                rows = chunk.rows,
                disposition = %chunk.disposition,
                job_id = %chunk.job_id,
                "Uploaded {} rows to BigQuery table {}",
                chunk.rows,
                self.table
            );
            Ok(Some(chunk))
        }
        .instrument(self.span.clone())
        .await
    }

    async fn stage_and_load(
        &self,
        page: &Page,
        staging: &StagingFile,
        disposition: WriteDisposition,
    ) -> Result<WrittenChunk, DestinationError> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;

        let batch = to_record_batch(page)?;
        let path = staging.path().to_path_buf();
        let staged_bytes = tokio::task::spawn_blocking(move || write_batch(&batch, &path))
            .await
            .map_err(|e| DestinationError::Staging(format!("staging task failed: {e}")))??;
        debug!(
            path = %staging.path().display(),
            staged_bytes,
            "Staged chunk ({:.2} MB)",
            megabytes(staged_bytes)
        );

        let outcome = self
            .loader
            .load_parquet(staging.path(), &self.table, disposition)
            .await?;

        Ok(WrittenChunk {
            rows: page.row_count() as u64,
            staged_bytes,
            disposition,
            job_id: outcome.job_id,
        })
    }
}
