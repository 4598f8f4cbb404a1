use engine_core::retry::{RetryDisposition, RetryError, RetryPolicy};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use uuid::Uuid;

/// A local staging file that must not outlive the chunk it was written for.
///
/// Call [`StagingFile::remove`] on every exit path; it retries briefly when
/// the file is still held by another process and only warns if it never
/// goes away. If the value is dropped without that call (an error unwound
/// past it, or the task was cancelled) `Drop` makes one synchronous attempt.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    retry: RetryPolicy,
    released: bool,
}

impl StagingFile {
    /// Reserves a uniquely named `chunk_<uuid>.parquet` path in `dir`.
    /// Nothing is created on disk.
    pub fn new_in(dir: &Path) -> Self {
        Self::at(dir.join(format!("chunk_{}.parquet", Uuid::new_v4())))
    }

    pub fn at(path: PathBuf) -> Self {
        StagingFile {
            path,
            retry: RetryPolicy::for_cleanup(),
            released: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file. A file that is already gone counts as removed.
    /// Returns `false` when every attempt failed; the transfer carries on.
    pub async fn remove(mut self) -> bool {
        self.released = true;
        let path = self.path.clone();

        let result = self
            .retry
            .run(
                || {
                    let path = path.clone();
                    async move { remove_if_present(&path).await }
                },
                |_| RetryDisposition::Retry,
            )
            .await;

        match result {
            Ok(()) => {
                debug!(path = %path.display(), "Removed staging file");
                true
            }
            Err(err) => {
                let attempts = match &err {
                    RetryError::AttemptsExceeded { attempts, .. } => *attempts,
                    RetryError::Fatal(_) => 1,
                };
                warn!(
                    path = %path.display(),
                    attempts,
                    error = %err.into_inner(),
                    "CleanupWarning: failed to remove staging file"
                );
                false
            }
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staging file on drop"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "CleanupWarning: failed to remove staging file on drop"
            ),
        }
    }
}

async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
