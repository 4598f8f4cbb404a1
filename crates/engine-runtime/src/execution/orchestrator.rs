use crate::execution::state::{RunState, TransferPhase};
use connectors::{
    bigquery::loader::LoadJobClient,
    sql::source::{SharedSource, SqlSource, shared},
};
use engine_config::{
    report::result::TransferResult,
    settings::{transfer::TransferConfig, write_mode::WriteMode},
};
use engine_core::metrics::megabytes;
use engine_processing::{reader::ChunkReader, resolver::RowCountResolver, writer::ChunkWriter};
use model::pagination::offset::OffsetWindow;
use std::{sync::Arc, time::Instant};
use tracing::{Instrument, Span, debug, info, info_span, warn};

/// Drives one transfer run: resolve the row count, then read and write
/// chunks strictly one after the other until the data or the count runs out.
pub struct TransferOrchestrator<S: SqlSource> {
    source: SharedSource<S>,
    resolver: RowCountResolver<S>,
    reader: ChunkReader<S>,
    writer: ChunkWriter,
    chunk_size: u64,
    write_mode: WriteMode,
    span: Span,
}

impl<S: SqlSource> TransferOrchestrator<S> {
    pub fn new(config: &TransferConfig, source: S, loader: Arc<dyn LoadJobClient>) -> Self {
        let span = info_span!(
            "transfer",
            source = %source.endpoint(),
            destination = %config.table_ref()
        );
        let source = shared(source);

        TransferOrchestrator {
            resolver: RowCountResolver::new(source.clone(), config).with_span(span.clone()),
            reader: ChunkReader::new(source.clone(), config).with_span(span.clone()),
            writer: ChunkWriter::new(loader, config).with_span(span.clone()),
            source,
            chunk_size: config.chunk_size(),
            write_mode: config.write_mode(),
            span,
        }
    }

    /// Runs the transfer to completion. Failures are reported in the
    /// returned result, never as an error. The source connection is closed
    /// on every outcome.
    pub async fn run(self) -> TransferResult {
        let span = self.span.clone();

        async move {
            let mut run = RunState::new();
            let mut phase = TransferPhase::Init;

            while !phase.is_terminal() {
                phase = self.advance(phase, &mut run).await;
                debug!(phase = %phase, "Transfer phase");
            }

            self.close_source().await;

            let metrics = run.metrics.snapshot();
            let result = match phase {
                TransferPhase::Failed(err) => TransferResult::failed(run.total_rows, metrics, err),
                _ => TransferResult::completed(run.total_rows, metrics),
            };
            result.log_summary();
            result
        }
        .instrument(span)
        .await
    }

    async fn advance(&self, phase: TransferPhase, run: &mut RunState) -> TransferPhase {
        match phase {
            TransferPhase::Init => TransferPhase::ResolvingCount,
            TransferPhase::ResolvingCount => match self.resolver.resolve_total_rows().await {
                Ok(total) => {
                    run.total_rows = total;
                    info!(total_rows = total, "Starting transfer of {total} rows");
                    TransferPhase::Looping { offset: 0 }
                }
                Err(err) => TransferPhase::Failed(err),
            },
            TransferPhase::Looping { offset } => self.process_chunk(offset, run).await,
            terminal => terminal,
        }
    }

    async fn process_chunk(&self, offset: u64, run: &mut RunState) -> TransferPhase {
        let Some(window) = OffsetWindow::at(offset, self.chunk_size, run.total_rows) else {
            return TransferPhase::Done;
        };
        // An offset past u64::MAX cannot address any more rows.
        let next = match offset.checked_add(self.chunk_size) {
            Some(offset) => TransferPhase::Looping { offset },
            None => TransferPhase::Done,
        };

        let started = Instant::now();
        info!(
            offset = window.offset,
            limit = window.limit,
            "Processing chunk at offset {} with limit {}",
            window.offset,
            window.limit
        );

        let page = match self.reader.read_chunk(window.offset, window.limit).await {
            Ok(page) => page,
            Err(err) => return TransferPhase::Failed(err),
        };

        if page.is_empty() {
            info!(offset, "Chunk is empty, skipping upload");
            return next;
        }

        let rows = page.row_count() as u64;
        let bytes = page.size_bytes() as u64;
        info!(rows, "Read {rows} rows ({:.2} MB)", megabytes(bytes));

        if let Err(err) = self
            .writer
            .write_chunk(&page, run.is_first_chunk, self.write_mode)
            .await
        {
            return TransferPhase::Failed(err);
        }
        run.commit(rows, bytes);

        info!(
            "Chunk processed in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );

        if page.is_short() {
            warn!(
                rows,
                expected = window.limit,
                "Received {rows} rows when expecting {}, reached end of data",
                window.limit
            );
            return TransferPhase::Done;
        }

        next
    }

    async fn close_source(&self) {
        let mut source = self.source.lock().await;
        match source.close().await {
            Ok(()) => debug!("Source connection closed"),
            Err(err) => warn!(error = %err, "Failed to close source connection"),
        }
    }
}
