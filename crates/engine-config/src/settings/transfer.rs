use crate::{error::ConfigError, settings::write_mode::WriteMode};
use connectors::bigquery::table::TableRef;
use model::execution::connection::{DestinationLocator, SourceAuth, SourceLocator, SourceSelection};
use std::path::PathBuf;

pub const DEFAULT_CHUNK_SIZE: u64 = 100_000;

/// Immutable parameters of one transfer run. Only constructed through
/// [`TransferConfig::new`], so every instance has passed validation.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    source: SourceLocator,
    destination: DestinationLocator,
    chunk_size: u64,
    total_rows: Option<u64>,
    write_mode: WriteMode,
    staging_dir: PathBuf,
}

impl TransferConfig {
    pub fn new(
        source: SourceLocator,
        destination: DestinationLocator,
        chunk_size: u64,
        write_mode: WriteMode,
    ) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }

        validate_source(&source)?;
        validate_destination(&destination)?;

        Ok(TransferConfig {
            source,
            destination,
            chunk_size,
            total_rows: None,
            write_mode,
            staging_dir: std::env::temp_dir(),
        })
    }

    /// Uses `total_rows` instead of counting the source.
    pub fn with_total_rows(mut self, total_rows: Option<u64>) -> Self {
        self.total_rows = total_rows;
        self
    }

    pub fn with_staging_dir(mut self, dir: PathBuf) -> Result<Self, ConfigError> {
        if dir.exists() && !dir.is_dir() {
            return Err(ConfigError::InvalidStagingDir(dir.display().to_string()));
        }
        self.staging_dir = dir;
        Ok(self)
    }

    pub fn source(&self) -> &SourceLocator {
        &self.source
    }

    pub fn selection(&self) -> &SourceSelection {
        &self.source.selection
    }

    pub fn destination(&self) -> &DestinationLocator {
        &self.destination
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(
            &self.destination.project,
            &self.destination.dataset,
            &self.destination.table,
        )
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn staging_dir(&self) -> &PathBuf {
        &self.staging_dir
    }
}

fn validate_source(source: &SourceLocator) -> Result<(), ConfigError> {
    require("source server", &source.host)?;
    require("source database", &source.database)?;

    match &source.selection {
        SourceSelection::Query(q) => require("source query", q)?,
        SourceSelection::Table(t) => require("source table", t)?,
    }

    if let SourceAuth::SqlServer { username, .. } = &source.auth {
        require("source username", username)?;
    }

    Ok(())
}

fn validate_destination(destination: &DestinationLocator) -> Result<(), ConfigError> {
    require("destination project", &destination.project)?;
    require("destination dataset", &destination.dataset)?;
    require("destination table", &destination.table)?;

    if destination.credentials_path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyField("credentials path"));
    }

    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::execution::connection::DEFAULT_SQL_SERVER_PORT;

    fn source(selection: SourceSelection) -> SourceLocator {
        SourceLocator {
            host: "db.internal".into(),
            port: DEFAULT_SQL_SERVER_PORT,
            database: "sales".into(),
            selection,
            auth: SourceAuth::SqlServer {
                username: "loader".into(),
                password: "secret".into(),
            },
            trust_cert: false,
        }
    }

    fn destination() -> DestinationLocator {
        DestinationLocator {
            project: "acme".into(),
            dataset: "warehouse".into(),
            table: "orders".into(),
            credentials_path: PathBuf::from("key.json"),
        }
    }

    #[test]
    fn valid_config_builds() {
        let config = TransferConfig::new(
            source(SourceSelection::Table("dbo.orders".into())),
            destination(),
            25,
            WriteMode::TruncateAppend,
        )
        .unwrap()
        .with_total_rows(Some(100));

        assert_eq!(config.chunk_size(), 25);
        assert_eq!(config.total_rows(), Some(100));
        assert_eq!(config.table_ref().to_string(), "acme.warehouse.orders");
        assert_eq!(config.staging_dir(), &std::env::temp_dir());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = TransferConfig::new(
            source(SourceSelection::Table("dbo.orders".into())),
            destination(),
            0,
            WriteMode::Append,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidChunkSize);
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        let mut dest = destination();
        dest.dataset = " ".into();
        let err = TransferConfig::new(
            source(SourceSelection::Query("SELECT 1 AS x".into())),
            dest,
            10,
            WriteMode::Append,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyField("destination dataset"));

        let err = TransferConfig::new(
            source(SourceSelection::Table(String::new())),
            destination(),
            10,
            WriteMode::Append,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyField("source table"));
    }

    #[test]
    fn staging_dir_must_be_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = TransferConfig::new(
            source(SourceSelection::Table("dbo.orders".into())),
            destination(),
            10,
            WriteMode::Append,
        )
        .unwrap();

        let err = config
            .clone()
            .with_staging_dir(file.path().to_path_buf())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStagingDir(_)));

        let dir = tempfile::tempdir().unwrap();
        let config = config.with_staging_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.staging_dir(), &dir.path().to_path_buf());
    }
}
