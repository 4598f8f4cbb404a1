use crate::error::DestinationError;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;
use yup_oauth2::{ServiceAccountAuthenticator, authenticator::DefaultAuthenticator};

pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, DestinationError>;
}

/// OAuth2 tokens minted from a service-account key file. Tokens are cached
/// and refreshed by the authenticator.
pub struct ServiceAccountTokens {
    auth: DefaultAuthenticator,
}

impl ServiceAccountTokens {
    pub async fn from_key_file(path: &Path) -> Result<Self, DestinationError> {
        let key = yup_oauth2::read_service_account_key(path).await.map_err(|e| {
            DestinationError::Auth(format!(
                "failed to read service account key {}: {e}",
                path.display()
            ))
        })?;

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| DestinationError::Auth(e.to_string()))?;

        let tokens = ServiceAccountTokens { auth };
        // Fail at startup rather than on the first chunk.
        tokens.access_token().await?;
        info!("BigQuery credentials loaded from {}", path.display());

        Ok(tokens)
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, DestinationError> {
        let token = self
            .auth
            .token(&[BIGQUERY_SCOPE])
            .await
            .map_err(|e| DestinationError::Auth(e.to_string()))?;

        token
            .token()
            .map(str::to_owned)
            .ok_or_else(|| DestinationError::Auth("token response carried no access token".into()))
    }
}

/// Fixed bearer token, for emulators and pre-minted credentials.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, DestinationError> {
        Ok(self.0.clone())
    }
}
