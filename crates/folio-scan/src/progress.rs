//! Scan progress reporting and cooperative cancellation.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Progress snapshot emitted between file boundaries.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Files fully processed so far.
    pub files_processed: u64,
    /// Directories visited so far.
    pub dirs_scanned: u64,
    /// Bytes hashed so far.
    pub bytes_hashed: u64,
    /// Path most recently processed.
    pub current_path: PathBuf,
    /// Issues recorded so far.
    pub issue_count: u64,
    /// Time elapsed since scan start.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Processing rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Shared cancellation flag, checked by workers between file boundaries.
///
/// Cancellation is cooperative: an aborted scan still returns the partial
/// result produced so far, with its completeness flag cleared.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
