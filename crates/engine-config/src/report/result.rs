use engine_core::metrics::MetricsSnapshot;
use serde::Serialize;
use tracing::{error, info};

/// Terminal record of a transfer run. On failure the counters hold whatever
/// had been committed before the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    pub success: bool,
    pub rows_transferred: u64,
    pub total_rows: u64,
    pub chunks_written: u64,
    pub bytes_transferred: u64,
    pub elapsed_secs: f64,
    pub rows_per_second: f64,
    pub mb_per_second: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferResult {
    pub fn completed(total_rows: u64, metrics: MetricsSnapshot) -> Self {
        Self::from_snapshot(true, total_rows, metrics, None)
    }

    pub fn failed(total_rows: u64, metrics: MetricsSnapshot, error: impl ToString) -> Self {
        Self::from_snapshot(false, total_rows, metrics, Some(error.to_string()))
    }

    fn from_snapshot(
        success: bool,
        total_rows: u64,
        metrics: MetricsSnapshot,
        error: Option<String>,
    ) -> Self {
        TransferResult {
            success,
            rows_transferred: metrics.rows_transferred,
            total_rows,
            chunks_written: metrics.chunks_written,
            bytes_transferred: metrics.bytes_transferred,
            elapsed_secs: metrics.elapsed_secs,
            rows_per_second: metrics.rows_per_second,
            mb_per_second: metrics.mb_per_second,
            error,
        }
    }

    pub fn log_summary(&self) {
        if self.success {
            info!(
                rows = self.rows_transferred,
                total_rows = self.total_rows,
                chunks = self.chunks_written,
                "Transfer completed: {} rows in {:.2}s ({:.0} rows/s, {:.2} MB/s)",
                self.rows_transferred,
                self.elapsed_secs,
                self.rows_per_second,
                self.mb_per_second
            );
        } else {
            error!(
                rows = self.rows_transferred,
                total_rows = self.total_rows,
                "Transfer failed after {} of {} rows: {}",
                self.rows_transferred,
                self.total_rows,
                self.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
