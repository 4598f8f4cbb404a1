use crate::error::TransferError;
use connectors::sql::{
    query::generator::QueryGenerator,
    source::{SharedSource, SqlSource},
};
use engine_config::settings::transfer::TransferConfig;
use model::execution::connection::SourceSelection;
use tracing::{Instrument, Span, info};

/// Determines how many rows a run is expected to move.
pub struct RowCountResolver<S: SqlSource> {
    source: SharedSource<S>,
    selection: SourceSelection,
    total_rows: Option<u64>,
    span: Span,
}

impl<S: SqlSource> RowCountResolver<S> {
    pub fn new(source: SharedSource<S>, config: &TransferConfig) -> Self {
        RowCountResolver {
            source,
            selection: config.selection().clone(),
            total_rows: config.total_rows(),
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the user-provided total unchanged when there is one;
    /// otherwise counts the source selection.
    pub async fn resolve_total_rows(&self) -> Result<u64, TransferError> {
        async {
            if let Some(total) = self.total_rows {
                info!(total_rows = total, "Using user-provided total row count");
                return Ok(total);
            }

            let sql = QueryGenerator::new(&self.selection).count();
            let total = self
                .source
                .lock()
                .await
                .query_count(&sql)
                .await
                .map_err(TransferError::RowCount)?;

            info!(total_rows = total, "Total rows to transfer: {total}");
            Ok(total)
        }
        .instrument(self.span.clone())
        .await
    }
}
