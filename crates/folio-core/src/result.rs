//! Unified scan result container and summary statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::duplicate::DuplicateGroup;
use crate::error::ScanIssue;
use crate::profile::Profile;
use crate::record::{FileCategory, FileRecord};
use crate::repo::RepositoryRecord;
use crate::skill::Skill;

/// Summary counts and totals for one scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Total files recorded (including excluded and errored).
    pub total_files: u64,
    /// Total directories visited.
    pub total_dirs: u64,
    /// Total bytes across recorded files.
    pub total_bytes: u64,
    /// Files per category (category, count), descending by count.
    pub files_by_category: Vec<(FileCategory, u64)>,
    /// Largest file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
    /// Repositories analyzed.
    pub repository_count: u64,
    /// Duplicate groups found.
    pub duplicate_group_count: u64,
    /// Total reclaimable bytes across duplicate groups.
    pub wasted_bytes: u64,
    /// Files whose content was hashed this run.
    pub files_hashed: u64,
    /// Files whose content fields were reused from a prior scan.
    pub files_reused: u64,
    /// Issues recorded.
    pub issue_count: u64,
    /// Wall-clock duration of the scan.
    pub duration: Duration,
    /// False when the scan was cancelled before finishing.
    pub complete: bool,
}

/// The complete, immutable output of one scan invocation.
///
/// Every record is created fresh per invocation; an incremental re-scan
/// merges into a new `ScanResult` rather than mutating a previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned.
    pub root: PathBuf,
    /// When the scan was performed.
    pub scanned_at: SystemTime,
    /// Profile used for the scan.
    pub profile: Profile,
    /// All file records, paths unique within this result.
    pub files: Vec<FileRecord>,
    /// Per-repository analysis records.
    pub repositories: Vec<RepositoryRecord>,
    /// Duplicate groups, ordered by descending wasted bytes.
    pub duplicates: Vec<DuplicateGroup>,
    /// Skills with accumulated evidence; zero-evidence skills are absent.
    pub skills: Vec<Skill>,
    /// Non-fatal issues recorded during the scan. Never silently dropped.
    pub issues: Vec<ScanIssue>,
    /// Summary counts and totals.
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Look up a file record by its relative path.
    pub fn file(&self, path: &std::path::Path) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }

    /// True if any issues were recorded.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Total reclaimable bytes across all duplicate groups.
    pub fn total_wasted_bytes(&self) -> u64 {
        self.duplicates.iter().map(|g| g.wasted_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_default() {
        let summary = ScanSummary::default();
        assert_eq!(summary.total_files, 0);
        assert!(!summary.complete);
    }
}
