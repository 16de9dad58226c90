//! Error taxonomy for the analysis engine.
//!
//! Only `EngineError` surfaces as a hard failure to the caller, and only for
//! conditions that invalidate the whole scan (a missing or unreadable root).
//! Everything else is accumulated as a `ScanIssue` and returned alongside
//! whatever was successfully produced.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors that abort an entire scan invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Root path does not exist.
    #[error("Root path not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Root path exists but is not a directory.
    #[error("Root path is not a directory: {path}")]
    RootNotADirectory { path: PathBuf },

    /// Root path could not be accessed.
    #[error("Root path inaccessible: {path}: {source}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid profile configuration.
    #[error("Invalid profile: {message}")]
    InvalidProfile { message: String },
}

impl EngineError {
    /// Classify an I/O error on the root path.
    pub fn root_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::RootInaccessible { path, source },
        }
    }
}

/// Kind of non-fatal issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Permission was denied reading a file.
    PermissionDenied,
    /// File could not be read (removed mid-scan, I/O failure).
    ReadError,
    /// Metadata could not be read.
    MetadataError,
    /// File exceeds the profile's size ceiling and was not read.
    Oversized,
    /// A repository's history is corrupt or unreadable.
    RepositoryError,
}

/// A non-fatal issue recorded during a scan. The scan always continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanIssue {
    /// Path where the issue occurred, relative to the scan root.
    pub path: PathBuf,
    /// Human-readable reason.
    pub reason: String,
    /// Issue kind.
    pub kind: IssueKind,
}

impl ScanIssue {
    /// Create a new issue.
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
            kind,
        }
    }

    /// Create a permission denied issue.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "permission denied", IssueKind::PermissionDenied)
    }

    /// Create a read error issue.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            Self::permission_denied(path)
        } else {
            Self::new(path, format!("read error: {error}"), IssueKind::ReadError)
        }
    }

    /// Create an oversized file issue.
    pub fn oversized(path: impl Into<PathBuf>, size: u64, limit: u64) -> Self {
        Self::new(
            path,
            format!("file size {size} exceeds limit {limit}"),
            IssueKind::Oversized,
        )
    }

    /// Create a repository error issue.
    pub fn repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(path, reason, IssueKind::RepositoryError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_io_classification() {
        let err = EngineError::root_io(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, EngineError::RootNotFound { .. }));

        let err = EngineError::root_io(
            "/locked",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, EngineError::RootInaccessible { .. }));
    }

    #[test]
    fn test_read_error_maps_permission() {
        let issue = ScanIssue::read_error(
            "secret.txt",
            &std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(issue.kind, IssueKind::PermissionDenied);
        assert_eq!(issue.reason, "permission denied");
    }

    #[test]
    fn test_oversized_reason() {
        let issue = ScanIssue::oversized("big.bin", 2048, 1024);
        assert_eq!(issue.kind, IssueKind::Oversized);
        assert!(issue.reason.contains("2048"));
    }
}
