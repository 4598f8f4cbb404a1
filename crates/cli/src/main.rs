use crate::{args::Args, error::CliError};
use clap::Parser;
use engine_config::{report::result::TransferResult, settings::transfer::TransferConfig};
use engine_core::metrics::MetricsSnapshot;
use engine_runtime::{error::StartupError, execution::factory};
use std::process::ExitCode;
use tracing::{error, info};

mod args;
mod error;
mod logging;
mod output;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = logging::init(&args.log_file) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(result) => exit_code(&result),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<TransferResult, CliError> {
    let config = args.to_config()?;
    info!(
        source = %config.source().endpoint(),
        destination = %config.table_ref(),
        chunk_size = config.chunk_size(),
        write_mode = %config.write_mode(),
        "Starting SQL Server to BigQuery transfer"
    );

    let result = match factory::create_orchestrator(&config).await {
        Ok(orchestrator) => orchestrator.run().await,
        Err(err) => startup_failure(&config, err),
    };

    if let Some(path) = &args.report {
        output::write_report(&result, path).await?;
        info!("Report written to {}", path.display());
    }

    Ok(result)
}

/// A run that never got to move data still reports, with zero counters.
fn startup_failure(config: &TransferConfig, err: StartupError) -> TransferResult {
    let result = TransferResult::failed(
        config.total_rows().unwrap_or(0),
        MetricsSnapshot::default(),
        err,
    );
    result.log_summary();
    result
}

fn exit_code(result: &TransferResult) -> ExitCode {
    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
