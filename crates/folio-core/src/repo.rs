//! Git repository analysis records.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Classification of a repository by distinct commit authorship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Exactly one distinct contributor.
    Individual,
    /// Two or more distinct contributors.
    Collaborative,
    /// Empty or unreadable history.
    Unknown,
}

impl ProjectType {
    /// Classify from a distinct contributor count. Pure function of the
    /// history: same commits always yield the same classification.
    pub fn from_contributor_count(count: usize) -> Self {
        match count {
            0 => Self::Unknown,
            1 => Self::Individual,
            _ => Self::Collaborative,
        }
    }
}

/// Per-contributor commit statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
    /// Identity exactly as recorded in the log.
    pub identity: Identity,
    /// Number of commits by this identity.
    pub commit_count: u64,
    /// Date of the first commit.
    pub first_commit: DateTime<Utc>,
    /// Date of the last commit.
    pub last_commit: DateTime<Utc>,
    /// Distinct calendar days (UTC) with at least one commit.
    pub active_days: u64,
}

/// One calendar month (UTC) of repository activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Year of the bucket.
    pub year: i32,
    /// Month of the bucket (1-12).
    pub month: u32,
    /// Commits in this month.
    pub commit_count: u64,
    /// Most recent commit messages, newest first.
    pub sample_messages: Vec<String>,
    /// Most frequently touched file paths with touch counts, descending.
    pub top_files: Vec<(String, u64)>,
    /// Language histogram from touched file extensions, descending.
    pub languages: Vec<(String, u64)>,
    /// Distinct contributors active this month.
    pub contributor_count: u64,
}

/// Complete analysis of one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Repository root path, relative to the scan root.
    pub root: PathBuf,
    /// Total commits analyzed.
    pub commit_count: u64,
    /// Date of the earliest commit.
    pub first_commit: Option<DateTime<Utc>>,
    /// Date of the latest commit.
    pub last_commit: Option<DateTime<Utc>>,
    /// Local branch names.
    pub branches: Vec<String>,
    /// Contributors ordered by commit count descending.
    pub contributors: Vec<ContributorRecord>,
    /// Monthly activity buckets in chronological order.
    pub timeline: Vec<TimelineBucket>,
    /// Classification by distinct authorship.
    pub project_type: ProjectType,
}

impl RepositoryRecord {
    /// Empty record for a repository whose history could not be read.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            commit_count: 0,
            first_commit: None,
            last_commit: None,
            branches: Vec::new(),
            contributors: Vec::new(),
            timeline: Vec::new(),
            project_type: ProjectType::Unknown,
        }
    }

    /// Number of distinct contributors.
    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }
}
