use crate::error::CliError;
use std::{fs::OpenOptions, path::Path, sync::Arc};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the process-wide subscriber: human-readable lines on stdout and
/// the same lines, without colors, appended to `log_file`.
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_file: &Path) -> Result<(), CliError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| CliError::Logging(format!("cannot open {}: {e}", log_file.display())))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
