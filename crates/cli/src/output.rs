use crate::error::CliError;
use engine_config::report::result::TransferResult;
use std::path::Path;

pub async fn write_report(result: &TransferResult, path: &Path) -> Result<(), CliError> {
    let report_json = result.to_json()?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}
