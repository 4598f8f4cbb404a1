use crate::{
    error::SourceError,
    sql::{
        mssql::decode::{decode_count, decode_row},
        source::SqlSource,
    },
};
use async_trait::async_trait;
use model::{
    execution::connection::{SourceAuth, SourceLocator},
    records::row::RowData,
};
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

type MssqlClient = Client<Compat<TcpStream>>;

/// SQL Server source over a single tiberius connection.
pub struct MssqlSource {
    config: Config,
    endpoint: String,
    client: Option<MssqlClient>,
}

impl MssqlSource {
    /// Opens the connection and verifies it with a trivial query.
    pub async fn connect(locator: &SourceLocator) -> Result<Self, SourceError> {
        let config = build_config(locator)?;
        let endpoint = locator.endpoint();

        let mut client = open(&config, &endpoint).await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| SourceError::connection(&endpoint, e))?
            .into_results()
            .await
            .map_err(|e| SourceError::connection(&endpoint, e))?;

        info!(endpoint = %endpoint, "SQL Server connection established");

        Ok(MssqlSource {
            config,
            endpoint,
            client: Some(client),
        })
    }

    fn client(&mut self) -> Result<&mut MssqlClient, SourceError> {
        let endpoint = &self.endpoint;
        self.client
            .as_mut()
            .ok_or_else(|| SourceError::connection(endpoint, "connection is closed"))
    }
}

fn build_config(locator: &SourceLocator) -> Result<Config, SourceError> {
    let mut config = Config::new();
    config.host(&locator.host);
    config.port(locator.port);
    config.database(&locator.database);
    config.application_name("mssql2bq");

    match &locator.auth {
        SourceAuth::SqlServer { username, password } => {
            config.authentication(AuthMethod::sql_server(username, password));
        }
        SourceAuth::Integrated => config.authentication(integrated_auth()?),
    }

    if locator.trust_cert {
        config.trust_cert();
    }

    Ok(config)
}

#[cfg(windows)]
fn integrated_auth() -> Result<AuthMethod, SourceError> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(windows))]
fn integrated_auth() -> Result<AuthMethod, SourceError> {
    Err(SourceError::IntegratedAuthUnavailable)
}

async fn open(config: &Config, endpoint: &str) -> Result<MssqlClient, SourceError> {
    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(|e| SourceError::connection(endpoint, e))?;
    tcp.set_nodelay(true)
        .map_err(|e| SourceError::connection(endpoint, e))?;

    Client::connect(config.clone(), tcp.compat_write())
        .await
        .map_err(|e| SourceError::connection(endpoint, e))
}

#[async_trait]
impl SqlSource for MssqlSource {
    async fn query_count(&mut self, sql: &str) -> Result<u64, SourceError> {
        debug!(sql, "Executing count query");
        let client = self.client()?;

        let row = client
            .simple_query(sql)
            .await
            .map_err(|e| SourceError::query(sql, e))?
            .into_row()
            .await
            .map_err(|e| SourceError::query(sql, e))?
            .ok_or_else(|| SourceError::UnexpectedResult {
                sql: sql.to_string(),
                message: "no rows returned".into(),
            })?;

        row.into_iter()
            .next()
            .and_then(decode_count)
            .ok_or_else(|| SourceError::UnexpectedResult {
                sql: sql.to_string(),
                message: "first column is not a non-negative integer count".into(),
            })
    }

    async fn query_rows(&mut self, sql: &str) -> Result<Vec<RowData>, SourceError> {
        debug!(sql, "Executing page query");
        let client = self.client()?;

        let rows = client
            .simple_query(sql)
            .await
            .map_err(|e| SourceError::query(sql, e))?
            .into_first_result()
            .await
            .map_err(|e| SourceError::query(sql, e))?;

        rows.into_iter().map(decode_row).collect()
    }

    async fn reconnect(&mut self) -> Result<(), SourceError> {
        warn!(endpoint = %self.endpoint, "Reconnecting to SQL Server");
        // The old connection is likely broken; dropping it is enough.
        self.client.take();
        let client = open(&self.config, &self.endpoint).await?;
        self.client = Some(client);
        info!(endpoint = %self.endpoint, "SQL Server connection re-established");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| SourceError::connection(&self.endpoint, e))?;
            info!(endpoint = %self.endpoint, "SQL Server connection closed");
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::execution::connection::SourceSelection;

    fn locator(auth: SourceAuth) -> SourceLocator {
        SourceLocator {
            host: "db.internal".into(),
            port: 14330,
            database: "sales".into(),
            selection: SourceSelection::Table("dbo.orders".into()),
            auth,
            trust_cert: true,
        }
    }

    #[test]
    fn config_uses_host_and_port() {
        let config = build_config(&locator(SourceAuth::SqlServer {
            username: "loader".into(),
            password: "secret".into(),
        }))
        .unwrap();
        assert_eq!(config.get_addr(), "db.internal:14330");
    }

    #[cfg(not(windows))]
    #[test]
    fn integrated_auth_is_rejected_off_windows() {
        let err = build_config(&locator(SourceAuth::Integrated)).unwrap_err();
        assert!(matches!(err, SourceError::IntegratedAuthUnavailable));
        assert!(err.is_connection());
    }
}
