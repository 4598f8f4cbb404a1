use crate::{error::StartupError, execution::orchestrator::TransferOrchestrator};
use connectors::{
    bigquery::{client::BigQueryClient, loader::LoadJobClient},
    sql::mssql::adapter::MssqlSource,
};
use engine_config::settings::transfer::TransferConfig;
use std::sync::Arc;
use tracing::{error, info};

/// Opens and verifies both endpoints, then wires the orchestrator.
/// Either connection failing is fatal here, before any data moves.
pub async fn create_orchestrator(
    config: &TransferConfig,
) -> Result<TransferOrchestrator<MssqlSource>, StartupError> {
    let source = connect_source(config).await?;
    let loader = connect_destination(config).await?;
    Ok(TransferOrchestrator::new(config, source, loader))
}

pub async fn connect_source(config: &TransferConfig) -> Result<MssqlSource, StartupError> {
    match MssqlSource::connect(config.source()).await {
        Ok(source) => {
            info!("SQL Server connection established successfully");
            Ok(source)
        }
        Err(err) => {
            error!(error = %err, "Failed to connect to SQL Server");
            Err(err.into())
        }
    }
}

pub async fn connect_destination(
    config: &TransferConfig,
) -> Result<Arc<dyn LoadJobClient>, StartupError> {
    let key_path = &config.destination().credentials_path;
    match BigQueryClient::from_service_account(key_path).await {
        Ok(client) => {
            info!(
                project = %config.destination().project,
                "BigQuery connection established successfully"
            );
            Ok(Arc::new(client))
        }
        Err(err) => {
            error!(error = %err, "Failed to connect to BigQuery");
            Err(err.into())
        }
    }
}
