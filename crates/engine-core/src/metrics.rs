use serde::Serialize;
use std::time::{Duration, Instant};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Counters accumulated over one transfer run.
#[derive(Debug, Clone)]
pub struct TransferMetrics {
    started: Instant,
    rows_transferred: u64,
    bytes_transferred: u64,
    chunks_written: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub rows_transferred: u64,
    pub bytes_transferred: u64,
    pub chunks_written: u64,
    pub elapsed_secs: f64,
    pub rows_per_second: f64,
    pub mb_per_second: f64,
}

impl TransferMetrics {
    pub fn start() -> Self {
        TransferMetrics {
            started: Instant::now(),
            rows_transferred: 0,
            bytes_transferred: 0,
            chunks_written: 0,
        }
    }

    pub fn record_chunk(&mut self, rows: u64, bytes: u64) {
        self.rows_transferred += rows;
        self.bytes_transferred += bytes;
        self.chunks_written += 1;
    }

    pub fn rows_transferred(&self) -> u64 {
        self.rows_transferred
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        Self::snapshot_at(
            self.rows_transferred,
            self.bytes_transferred,
            self.chunks_written,
            self.elapsed(),
        )
    }

    fn snapshot_at(rows: u64, bytes: u64, chunks: u64, elapsed: Duration) -> MetricsSnapshot {
        let secs = elapsed.as_secs_f64();
        let (rows_per_second, mb_per_second) = if secs > 0.0 {
            (rows as f64 / secs, bytes as f64 / BYTES_PER_MB / secs)
        } else {
            (0.0, 0.0)
        };

        MetricsSnapshot {
            rows_transferred: rows,
            bytes_transferred: bytes,
            chunks_written: chunks,
            elapsed_secs: secs,
            rows_per_second,
            mb_per_second,
        }
    }
}

pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut metrics = TransferMetrics::start();
        metrics.record_chunk(25, 1024);
        metrics.record_chunk(10, 512);

        let snap = metrics.snapshot();
        assert_eq!(snap.rows_transferred, 35);
        assert_eq!(snap.bytes_transferred, 1536);
        assert_eq!(snap.chunks_written, 2);
    }

    #[test]
    fn rates_are_derived_from_elapsed_time() {
        let snap = TransferMetrics::snapshot_at(100, 2 * 1024 * 1024, 4, Duration::from_secs(2));
        assert_eq!(snap.rows_per_second, 50.0);
        assert_eq!(snap.mb_per_second, 1.0);
    }

    #[test]
    fn zero_elapsed_yields_zero_rates() {
        let snap = TransferMetrics::snapshot_at(100, 100, 1, Duration::ZERO);
        assert_eq!(snap.rows_per_second, 0.0);
        assert_eq!(snap.mb_per_second, 0.0);
    }
}
