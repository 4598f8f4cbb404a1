use thiserror::Error;

/// Errors raised while validating transfer parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Either a source query or a source table must be provided")]
    MissingSelection,

    #[error("Provide either a source query or a source table, not both")]
    AmbiguousSelection,

    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("Invalid write mode '{0}': expected 'truncate_append' or 'append'")]
    InvalidWriteMode(String),

    /// A required identifier was empty or whitespace.
    #[error("Missing value for {0}")]
    EmptyField(&'static str),

    #[error("Staging path {0} exists and is not a directory")]
    InvalidStagingDir(String),
}
