use connectors::error::{DestinationError, SourceError};
use engine_config::error::ConfigError;
use thiserror::Error;

/// Errors that stop a run before the first chunk is read.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to SQL Server: {0}")]
    Source(#[from] SourceError),

    #[error("Failed to connect to BigQuery: {0}")]
    Destination(#[from] DestinationError),
}
