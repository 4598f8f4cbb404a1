use clap::Parser;
use engine_config::{
    error::ConfigError,
    settings::{
        selection::resolve_selection,
        transfer::{DEFAULT_CHUNK_SIZE, TransferConfig},
        write_mode::WriteMode,
    },
};
use model::execution::connection::{
    DEFAULT_SQL_SERVER_PORT, DestinationLocator, SourceAuth, SourceLocator,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mssql2bq",
    version,
    about = "Transfer data from SQL Server to BigQuery"
)]
pub struct Args {
    #[arg(long, help = "SQL Server hostname")]
    pub sql_server: String,

    #[arg(long, default_value_t = DEFAULT_SQL_SERVER_PORT, help = "SQL Server port")]
    pub sql_port: u16,

    #[arg(long, help = "SQL Server database name")]
    pub sql_database: String,

    #[arg(
        long,
        conflicts_with = "sql_query",
        required_unless_present = "sql_query",
        help = "SQL Server table name"
    )]
    pub sql_table: Option<String>,

    #[arg(long, help = "Custom SQL query to select data")]
    pub sql_query: Option<String>,

    #[arg(
        long,
        requires = "sql_password",
        help = "SQL Server username (omit to use integrated authentication)"
    )]
    pub sql_username: Option<String>,

    #[arg(long, env = "SQL_PASSWORD", hide_env_values = true, help = "SQL Server password")]
    pub sql_password: Option<String>,

    #[arg(long, help = "Trust the server certificate without validation")]
    pub trust_cert: bool,

    #[arg(long, help = "BigQuery project ID")]
    pub bq_project: String,

    #[arg(long, help = "BigQuery dataset name")]
    pub bq_dataset: String,

    #[arg(long, help = "BigQuery table name")]
    pub bq_table: String,

    #[arg(long, help = "Path to service account key file")]
    pub key_path: PathBuf,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Rows per chunk")]
    pub chunk_size: u64,

    #[arg(long, help = "Total rows returned by the table or query; skips the COUNT query")]
    pub total_rows: Option<u64>,

    #[arg(
        long,
        default_value_t = WriteMode::TruncateAppend,
        help = "Write mode for the BigQuery table (truncate_append or append)"
    )]
    pub write_mode: WriteMode,

    #[arg(long, help = "Directory for staging files (defaults to the system temp dir)")]
    pub staging_dir: Option<PathBuf>,

    #[arg(long, default_value = "transfer.log", help = "Log file, appended to")]
    pub log_file: PathBuf,

    #[arg(long, help = "If specified, writes the JSON result to this file")]
    pub report: Option<PathBuf>,
}

impl Args {
    pub fn to_config(&self) -> Result<TransferConfig, ConfigError> {
        let selection = resolve_selection(self.sql_query.clone(), self.sql_table.clone())?;

        let auth = match &self.sql_username {
            Some(username) => SourceAuth::SqlServer {
                username: username.clone(),
                password: self.sql_password.clone().unwrap_or_default(),
            },
            None => SourceAuth::Integrated,
        };

        let source = SourceLocator {
            host: self.sql_server.clone(),
            port: self.sql_port,
            database: self.sql_database.clone(),
            selection,
            auth,
            trust_cert: self.trust_cert,
        };

        let destination = DestinationLocator {
            project: self.bq_project.clone(),
            dataset: self.bq_dataset.clone(),
            table: self.bq_table.clone(),
            credentials_path: self.key_path.clone(),
        };

        let config = TransferConfig::new(source, destination, self.chunk_size, self.write_mode)?
            .with_total_rows(self.total_rows);

        match &self.staging_dir {
            Some(dir) => config.with_staging_dir(dir.clone()),
            None => Ok(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::execution::connection::SourceSelection;

    const REQUIRED: &[&str] = &[
        "mssql2bq",
        "--sql-server",
        "db.internal",
        "--sql-database",
        "sales",
        "--bq-project",
        "acme",
        "--bq-dataset",
        "warehouse",
        "--bq-table",
        "orders",
        "--key-path",
        "key.json",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(REQUIRED.iter().chain(extra.iter()).copied())
    }

    #[test]
    fn defaults_apply() {
        let args = parse(&["--sql-table", "dbo.orders"]).unwrap();
        assert_eq!(args.sql_port, 1433);
        assert_eq!(args.chunk_size, 100_000);
        assert_eq!(args.write_mode, WriteMode::TruncateAppend);
        assert_eq!(args.log_file, PathBuf::from("transfer.log"));

        let config = args.to_config().unwrap();
        assert_eq!(config.selection(), &SourceSelection::Table("dbo.orders".into()));
        assert_eq!(config.source().auth, SourceAuth::Integrated);
        assert_eq!(config.total_rows(), None);
    }

    #[test]
    fn table_and_query_are_exclusive() {
        assert!(parse(&["--sql-table", "t", "--sql-query", "SELECT 1"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn username_requires_password() {
        assert!(parse(&["--sql-table", "t", "--sql-username", "loader"]).is_err());

        let args = parse(&[
            "--sql-query",
            "SELECT id FROM dbo.orders",
            "--sql-username",
            "loader",
            "--sql-password",
            "secret",
            "--write-mode",
            "append",
            "--total-rows",
            "500",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(
            config.source().auth,
            SourceAuth::SqlServer {
                username: "loader".into(),
                password: "secret".into()
            }
        );
        assert_eq!(config.write_mode(), WriteMode::Append);
        assert_eq!(config.total_rows(), Some(500));
    }

    #[test]
    fn invalid_write_mode_is_rejected() {
        assert!(parse(&["--sql-table", "t", "--write-mode", "overwrite"]).is_err());
    }

    #[test]
    fn zero_chunk_size_fails_validation() {
        let args = parse(&["--sql-table", "t", "--chunk-size", "0"]).unwrap();
        assert_eq!(args.to_config().unwrap_err(), ConfigError::InvalidChunkSize);
    }
}
