//! Subset of the BigQuery `Job` REST resource used by load jobs.

use crate::bigquery::table::{TableRef, WriteDisposition};
use serde::{Deserialize, Serialize};

pub const STATE_DONE: &str = "DONE";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInsert {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobConfiguration {
    pub load: LoadConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfiguration {
    pub destination_table: TableRef,
    pub source_format: &'static str,
    pub write_disposition: WriteDisposition,
    pub create_disposition: &'static str,
    pub autodetect: bool,
}

impl JobInsert {
    pub fn parquet_load(job_id: String, table: &TableRef, disposition: WriteDisposition) -> Self {
        JobInsert {
            job_reference: JobReference {
                project_id: table.project_id.clone(),
                job_id,
                location: None,
            },
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: table.clone(),
                    source_format: "PARQUET",
                    write_disposition: disposition,
                    create_disposition: "CREATE_IF_NEEDED",
                    autodetect: true,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_reference: Option<JobReference>,
    pub status: Option<JobStatus>,
    pub statistics: Option<JobStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: Option<String>,
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorProto {
    pub reason: Option<String>,
    pub location: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatistics {
    pub load: Option<LoadStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatistics {
    // int64 fields are JSON strings in the REST API
    pub output_rows: Option<String>,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .is_some_and(|state| state == STATE_DONE)
    }

    /// Diagnostic message when the job finished with an error.
    pub fn failure_message(&self) -> Option<String> {
        let status = self.status.as_ref()?;
        let error = status.error_result.as_ref()?;

        let mut message = error
            .message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        if let Some(reason) = &error.reason {
            message = format!("{reason}: {message}");
        }

        let details: Vec<&str> = status
            .errors
            .iter()
            .filter_map(|e| e.message.as_deref())
            .filter(|m| Some(*m) != error.message.as_deref())
            .collect();
        if !details.is_empty() {
            message = format!("{message} ({})", details.join("; "));
        }

        Some(message)
    }

    pub fn output_rows(&self) -> Option<u64> {
        self.statistics
            .as_ref()?
            .load
            .as_ref()?
            .output_rows
            .as_deref()?
            .parse()
            .ok()
    }
}

/// Error envelope returned by Google APIs on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
