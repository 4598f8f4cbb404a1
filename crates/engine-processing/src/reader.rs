use crate::error::TransferError;
use connectors::sql::{
    query::generator::QueryGenerator,
    source::{SharedSource, SqlSource},
};
use engine_config::settings::transfer::TransferConfig;
use model::{
    execution::connection::SourceSelection, pagination::offset::OffsetWindow,
    records::batch::Page,
};
use tracing::{Instrument, Span, debug, error, info};

/// Reads one bounded page of the source selection per call.
///
/// Pages are cut with `ORDER BY (SELECT NULL)`, so which rows land on which
/// page is up to the server. Callers that need reproducible page boundaries
/// must supply a query whose own ordering is deterministic.
pub struct ChunkReader<S: SqlSource> {
    source: SharedSource<S>,
    selection: SourceSelection,
    span: Span,
}

impl<S: SqlSource> ChunkReader<S> {
    pub fn new(source: SharedSource<S>, config: &TransferConfig) -> Self {
        ChunkReader {
            source,
            selection: config.selection().clone(),
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Fetches rows `[offset, offset + limit)`. Past the end of the data the
    /// page is empty rather than an error.
    ///
    /// A fetch that fails at the connection or query level triggers exactly
    /// one reconnect so the next call starts from a fresh connection; the
    /// fetch itself is not repeated and the original error is returned.
    pub async fn read_chunk(&self, offset: u64, limit: u64) -> Result<Page, TransferError> {
        let window = OffsetWindow::new(offset, limit);
        let sql = QueryGenerator::new(&self.selection).page(window);

        async {
            let mut source = self.source.lock().await;

            match source.query_rows(&sql).await {
                Ok(rows) => {
                    debug!(offset, limit, rows = rows.len(), "Fetched chunk");
                    Ok(Page::new(window, rows))
                }
                Err(err) => {
                    error!(offset, limit, error = %err, "Error reading chunk");

                    if err.may_break_connection() {
                        match source.reconnect().await {
                            Ok(()) => info!("Source connection re-established after read failure"),
                            Err(reconnect_err) => {
                                error!(error = %reconnect_err, "Failed to reconnect to source")
                            }
                        }
                    }

                    Err(TransferError::Read {
                        offset,
                        limit,
                        source: err,
                    })
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }
}
