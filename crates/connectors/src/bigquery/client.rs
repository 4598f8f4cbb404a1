use crate::{
    bigquery::{
        auth::{AccessTokenProvider, ServiceAccountTokens},
        job::{ApiErrorEnvelope, Job, JobInsert, JobReference},
        loader::{LoadJobClient, LoadJobOutcome},
        table::{TableRef, WriteDisposition},
    },
    error::DestinationError,
};
use async_trait::async_trait;
use reqwest::{Response, header::LOCATION};
use std::{path::Path, sync::Arc, time::Duration};
use tracing::{debug, info};
use uuid::Uuid;

const API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";
const UPLOAD_BASE: &str = "https://bigquery.googleapis.com/upload/bigquery/v2";
const INITIAL_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// BigQuery load-job client: uploads a local file through the resumable
/// media endpoint and polls the job until it is done. Waiting has no
/// timeout; a job that never finishes blocks the caller.
pub struct BigQueryClient {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    api_base: String,
    upload_base: String,
}

impl BigQueryClient {
    pub fn new(tokens: Arc<dyn AccessTokenProvider>) -> Self {
        BigQueryClient {
            http: reqwest::Client::new(),
            tokens,
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    pub async fn from_service_account(key_path: &Path) -> Result<Self, DestinationError> {
        let tokens = ServiceAccountTokens::from_key_file(key_path).await?;
        Ok(Self::new(Arc::new(tokens)))
    }

    /// Points the client at a different root, e.g. a local emulator.
    pub fn with_endpoint(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.api_base = format!("{root}/bigquery/v2");
        self.upload_base = format!("{root}/upload/bigquery/v2");
        self
    }

    fn jobs_upload_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{project}/jobs?uploadType=resumable",
            self.upload_base
        )
    }

    fn job_url(&self, reference: &JobReference) -> String {
        let mut url = format!(
            "{}/projects/{}/jobs/{}",
            self.api_base, reference.project_id, reference.job_id
        );
        if let Some(location) = &reference.location {
            url.push_str(&format!("?location={location}"));
        }
        url
    }

    /// Opens a resumable upload session for a new load job.
    async fn start_upload(
        &self,
        insert: &JobInsert,
        size: u64,
    ) -> Result<String, DestinationError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.jobs_upload_url(&insert.job_reference.project_id))
            .bearer_auth(token)
            .header("X-Upload-Content-Type", "application/octet-stream")
            .header("X-Upload-Content-Length", size.to_string())
            .json(insert)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                DestinationError::UnexpectedResponse("upload session has no Location header".into())
            })
    }

    async fn upload(&self, session_url: &str, bytes: Vec<u8>) -> Result<Job, DestinationError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .put(session_url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Job>().await?)
    }

    async fn get_job(&self, reference: &JobReference) -> Result<Job, DestinationError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.job_url(reference))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Job>().await?)
    }

    async fn wait_for_job(
        &self,
        mut job: Job,
        fallback: &JobReference,
    ) -> Result<Job, DestinationError> {
        let reference = job.job_reference.clone().unwrap_or_else(|| fallback.clone());
        let mut interval = INITIAL_POLL_INTERVAL;

        while !job.is_done() {
            debug!(job_id = %reference.job_id, "Load job still running");
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(MAX_POLL_INTERVAL);
            job = self.get_job(&reference).await?;
        }

        match job.failure_message() {
            Some(message) => Err(DestinationError::JobFailed {
                job_id: reference.job_id.clone(),
                message,
            }),
            None => Ok(job),
        }
    }
}

#[async_trait]
impl LoadJobClient for BigQueryClient {
    async fn load_parquet(
        &self,
        path: &Path,
        table: &TableRef,
        disposition: WriteDisposition,
    ) -> Result<LoadJobOutcome, DestinationError> {
        let job_id = format!("mssql2bq_{}", Uuid::new_v4().simple());
        let insert = JobInsert::parquet_load(job_id.clone(), table, disposition);
        let bytes = tokio::fs::read(path).await?;

        info!(
            job_id = %job_id,
            table = %table,
            disposition = %disposition,
            bytes = bytes.len(),
            "Submitting load job"
        );

        let session_url = self.start_upload(&insert, bytes.len() as u64).await?;
        let job = self.upload(&session_url, bytes).await?;
        let job = self.wait_for_job(job, &insert.job_reference).await?;

        Ok(LoadJobOutcome {
            job_id,
            output_rows: job.output_rows(),
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response, DestinationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(DestinationError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigquery::auth::StaticToken;

    fn client() -> BigQueryClient {
        BigQueryClient::new(Arc::new(StaticToken("token".into())))
    }

    #[test]
    fn upload_url_targets_media_endpoint() {
        assert_eq!(
            client().jobs_upload_url("acme"),
            "https://bigquery.googleapis.com/upload/bigquery/v2/projects/acme/jobs?uploadType=resumable"
        );
    }

    #[test]
    fn job_url_carries_location() {
        let reference = JobReference {
            project_id: "acme".into(),
            job_id: "job_1".into(),
            location: Some("EU".into()),
        };
        assert_eq!(
            client().job_url(&reference),
            "https://bigquery.googleapis.com/bigquery/v2/projects/acme/jobs/job_1?location=EU"
        );
    }

    #[test]
    fn custom_endpoint_replaces_both_roots() {
        let client = client().with_endpoint("http://localhost:9050/");
        assert_eq!(
            client.jobs_upload_url("p"),
            "http://localhost:9050/upload/bigquery/v2/projects/p/jobs?uploadType=resumable"
        );
        let reference = JobReference {
            project_id: "p".into(),
            job_id: "j".into(),
            location: None,
        };
        assert_eq!(
            client.job_url(&reference),
            "http://localhost:9050/bigquery/v2/projects/p/jobs/j"
        );
    }
}
