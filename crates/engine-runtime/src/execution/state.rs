use engine_core::metrics::TransferMetrics;
use engine_processing::error::TransferError;
use std::fmt;

/// Where a transfer run is in its lifecycle.
#[derive(Debug)]
pub enum TransferPhase {
    Init,
    ResolvingCount,
    Looping { offset: u64 },
    Done,
    Failed(TransferError),
}

impl TransferPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferPhase::Done | TransferPhase::Failed(_))
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPhase::Init => write!(f, "init"),
            TransferPhase::ResolvingCount => write!(f, "resolving_count"),
            TransferPhase::Looping { offset } => write!(f, "looping({offset})"),
            TransferPhase::Done => write!(f, "done"),
            TransferPhase::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Mutable bookkeeping of one run. Discarded once the result is built.
#[derive(Debug)]
pub struct RunState {
    pub total_rows: u64,
    pub is_first_chunk: bool,
    pub metrics: TransferMetrics,
}

impl RunState {
    pub fn new() -> Self {
        RunState {
            total_rows: 0,
            is_first_chunk: true,
            metrics: TransferMetrics::start(),
        }
    }

    /// Accounts for a chunk that was committed to the destination.
    pub fn commit(&mut self, rows: u64, bytes: u64) {
        self.metrics.record_chunk(rows, bytes);
        self.is_first_chunk = false;
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
