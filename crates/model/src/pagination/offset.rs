use serde::{Deserialize, Serialize};

/// `OFFSET <offset> ROWS FETCH NEXT <limit> ROWS ONLY` window over the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetWindow {
    pub offset: u64,
    pub limit: u64,
}

impl OffsetWindow {
    pub fn new(offset: u64, limit: u64) -> Self {
        OffsetWindow { offset, limit }
    }

    /// Window for the chunk starting at `offset`; the last chunk gets the
    /// remainder. Returns `None` once `offset` has reached `total_rows`.
    pub fn at(offset: u64, chunk_size: u64, total_rows: u64) -> Option<Self> {
        if offset >= total_rows {
            return None;
        }
        Some(OffsetWindow {
            offset,
            limit: chunk_size.min(total_rows - offset),
        })
    }
}
