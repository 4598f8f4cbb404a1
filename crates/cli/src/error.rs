use engine_config::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to set up logging: {0}")]
    Logging(String),

    #[error("Failed to write the report: {0}")]
    ReportWrite(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
