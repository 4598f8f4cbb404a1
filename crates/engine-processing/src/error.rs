use connectors::error::{DestinationError, SourceError};
use thiserror::Error;

/// Failure of one step of a transfer run.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Error getting row count: {0}")]
    RowCount(#[source] SourceError),

    #[error("Error reading chunk at offset {offset}, limit {limit}: {source}")]
    Read {
        offset: u64,
        limit: u64,
        #[source]
        source: SourceError,
    },

    #[error("Error uploading chunk at offset {offset} to BigQuery: {source}")]
    Write {
        offset: u64,
        #[source]
        source: DestinationError,
    },
}
