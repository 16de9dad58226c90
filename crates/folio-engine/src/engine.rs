//! Scan orchestration: walk, analyses, and result assembly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info};

use folio_analyze::{
    ContributionAggregator, ContributionConfig, ContributionReport, DuplicateDetector,
    GitAnalyzer, RepoError, SkillAnalyzer,
};
use folio_core::{
    DuplicateGroup, EngineError, FileCategory, FileRecord, Profile, RepositoryRecord, ScanIssue,
    ScanResult, ScanSummary, Skill,
};
use folio_scan::{
    CancelToken, PriorIndex, RepoMarker, ScanProgress, VcsKind, WalkOutput, Walker,
    closest_repository,
};

/// Drives a full scan: parallel walk and extraction, then per-repository
/// history analysis, duplicate grouping, and skill evidence collection,
/// assembled into one immutable [`ScanResult`].
pub struct Engine {
    profile: Profile,
    walker: Walker,
    git: GitAnalyzer,
    skills: SkillAnalyzer,
}

impl Engine {
    /// Create an engine with the given profile.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            walker: Walker::new(),
            git: GitAnalyzer::new(),
            skills: SkillAnalyzer::new(),
        }
    }

    /// The profile this engine scans with.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Subscribe to per-file progress updates for scans run on this engine.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.walker.subscribe()
    }

    /// Scan a root from scratch.
    ///
    /// A missing or inaccessible root is the only hard failure; everything
    /// else is recorded in the result's issue list. Cancellation yields a
    /// partial result with `summary.complete == false`, never an error.
    pub fn scan(&self, root: &Path, cancel: &CancelToken) -> Result<ScanResult, EngineError> {
        self.run(root, None, cancel)
    }

    /// Re-scan a root, reusing content fields from a prior result for files
    /// whose size and mtime are unchanged. Produces a fresh result; the
    /// prior one is never mutated.
    pub fn rescan(
        &self,
        root: &Path,
        prior: &ScanResult,
        cancel: &CancelToken,
    ) -> Result<ScanResult, EngineError> {
        let index = PriorIndex::from_result(prior);
        debug!(entries = index.len(), "prior index built");
        self.run(root, Some(&index), cancel)
    }

    /// Per-repository contribution reports over a finished scan.
    pub fn contribution_reports(
        &self,
        result: &ScanResult,
        config: ContributionConfig,
    ) -> Vec<ContributionReport> {
        let aggregator = ContributionAggregator::with_config(config);
        let roots: Vec<PathBuf> = result.repositories.iter().map(|r| r.root.clone()).collect();

        result
            .repositories
            .iter()
            .map(|repo| {
                let files: Vec<&FileRecord> = result
                    .files
                    .iter()
                    .filter(|f| closest_repository(&roots, &f.path) == Some(&repo.root))
                    .collect();
                let categories = skill_categories_under(&result.skills, &repo.root);
                aggregator.aggregate(repo, &files, categories)
            })
            .collect()
    }

    fn run(
        &self,
        root: &Path,
        prior: Option<&PriorIndex>,
        cancel: &CancelToken,
    ) -> Result<ScanResult, EngineError> {
        let start = Instant::now();
        let canonical = root
            .canonicalize()
            .map_err(|e| EngineError::root_io(root, e))?;
        info!(root = %canonical.display(), profile = %self.profile.name, "scan started");

        let walk = self.walker.walk(&canonical, &self.profile, prior, cancel)?;
        let WalkOutput {
            files,
            repositories: markers,
            mut issues,
            total_dirs,
            files_hashed,
            files_reused,
            complete,
        } = walk;
        debug!(files_hashed, files_reused, "extraction finished");

        let repositories = self.analyze_repositories(&canonical, &markers, cancel, &mut issues);

        let duplicates =
            DuplicateDetector::new(self.profile.min_duplicate_size).detect(&files);

        let skills = if cancel.is_cancelled() {
            Vec::new()
        } else {
            self.skills.analyze_files(&canonical, &files)
        };

        issues.sort_by(|a, b| a.path.cmp(&b.path));
        let complete = complete && !cancel.is_cancelled();
        let mut summary = summarize(
            &files,
            total_dirs,
            &repositories,
            &duplicates,
            &issues,
            start.elapsed(),
            complete,
        );
        summary.files_hashed = files_hashed;
        summary.files_reused = files_reused;
        info!(
            files = summary.total_files,
            repos = summary.repository_count,
            issues = summary.issue_count,
            complete,
            "scan finished"
        );

        Ok(ScanResult {
            root: canonical,
            scanned_at: SystemTime::now(),
            profile: self.profile.clone(),
            files,
            repositories,
            duplicates,
            skills,
            issues,
            summary,
        })
    }

    /// Analyze each discovered repository root. Non-git markers and failed
    /// analyses become issues; the scan never aborts here.
    fn analyze_repositories(
        &self,
        canonical: &Path,
        markers: &[RepoMarker],
        cancel: &CancelToken,
        issues: &mut Vec<ScanIssue>,
    ) -> Vec<RepositoryRecord> {
        let (git_markers, other): (Vec<&RepoMarker>, Vec<&RepoMarker>) =
            markers.iter().partition(|m| m.vcs == VcsKind::Git);

        for marker in other {
            let err = RepoError::UnsupportedVcs {
                path: marker.root.clone(),
            };
            issues.push(ScanIssue::repository(marker.root.clone(), err.to_string()));
        }

        let outcomes: Vec<_> = git_markers
            .par_iter()
            .filter_map(|marker| {
                // Cancellation is checked between repository boundaries.
                if cancel.is_cancelled() {
                    return None;
                }
                let workdir = canonical.join(&marker.root);
                Some(
                    self.git
                        .analyze(&workdir, marker.root.clone())
                        .map_err(|e| (marker.root.clone(), e.to_string())),
                )
            })
            .collect();

        let mut repositories = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(record) => repositories.push(record),
                Err((root, reason)) => issues.push(ScanIssue::repository(root, reason)),
            }
        }
        repositories.sort_by(|a, b| a.root.cmp(&b.root));
        repositories
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Profile::default())
    }
}

/// Distinct skill categories with evidence under a repository root. An empty
/// root covers the whole tree.
fn skill_categories_under(skills: &[Skill], repo_root: &Path) -> usize {
    let categories: BTreeSet<_> = skills
        .iter()
        .filter(|skill| {
            skill.evidence.iter().any(|e| {
                repo_root.as_os_str().is_empty() || e.source.starts_with(repo_root)
            })
        })
        .map(|skill| skill.category)
        .collect();
    categories.len()
}

fn summarize(
    files: &[FileRecord],
    total_dirs: u64,
    repositories: &[RepositoryRecord],
    duplicates: &[DuplicateGroup],
    issues: &[ScanIssue],
    duration: std::time::Duration,
    complete: bool,
) -> ScanSummary {
    let mut by_category: std::collections::BTreeMap<FileCategory, u64> =
        std::collections::BTreeMap::new();
    let mut total_bytes: u64 = 0;
    let mut largest_file: Option<(PathBuf, u64)> = None;

    for record in files {
        *by_category.entry(record.category).or_default() += 1;
        total_bytes += record.size;
        if largest_file.as_ref().is_none_or(|(_, size)| record.size > *size) {
            largest_file = Some((record.path.clone(), record.size));
        }
    }

    let mut files_by_category: Vec<(FileCategory, u64)> = by_category.into_iter().collect();
    files_by_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ScanSummary {
        total_files: files.len() as u64,
        total_dirs,
        total_bytes,
        files_by_category,
        largest_file,
        repository_count: repositories.len() as u64,
        duplicate_group_count: duplicates.len() as u64,
        wasted_bytes: duplicates.iter().map(|g| g.wasted_bytes).sum(),
        files_hashed: 0,
        files_reused: 0,
        issue_count: issues.len() as u64,
        duration,
        complete,
    }
}
