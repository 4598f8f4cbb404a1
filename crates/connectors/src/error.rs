use thiserror::Error;

/// Errors raised by the relational source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The connection could not be opened, was lost, or could not be closed.
    #[error("Failed to connect to SQL Server at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// A count or page query failed to execute.
    #[error("Query failed: {message} (sql: {sql})")]
    Query { sql: String, message: String },

    /// The query ran but its result had an unexpected shape.
    #[error("Unexpected result for `{sql}`: {message}")]
    UnexpectedResult { sql: String, message: String },

    /// A column value could not be converted.
    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("Integrated authentication is not available on this platform; supply a username and password")]
    IntegratedAuthUnavailable,
}

impl SourceError {
    pub fn connection(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SourceError::Connection {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    pub fn query(sql: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SourceError::Query {
            sql: sql.into(),
            message: err.to_string(),
        }
    }

    /// Whether the failure may have left the connection unusable. Decode and
    /// result-shape errors are raised after the server has answered.
    pub fn may_break_connection(&self) -> bool {
        matches!(self, SourceError::Connection { .. } | SourceError::Query { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            SourceError::Connection { .. } | SourceError::IntegratedAuthUnavailable
        )
    }
}

/// Errors raised while staging a page or loading it into the warehouse.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Failed to stage page: {0}")]
    Staging(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BigQuery API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Load job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
