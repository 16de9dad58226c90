//! Parallel directory walker and extraction driver.
//!
//! A jwalk producer lists entries while per-file extraction (hashing,
//! classification, enrichment) fans out across a rayon pool. Repository
//! boundaries are detected during the walk; nested repositories are each
//! reported as independent roots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashSet;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::debug;

use folio_core::{EngineError, FileRecord, IssueKind, Profile, ScanIssue};

use crate::metadata::extract_record;
use crate::prior::PriorIndex;
use crate::progress::{CancelToken, ScanProgress};

/// Version control system recognized as a repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    Mercurial,
    Subversion,
}

impl VcsKind {
    fn from_marker(name: &str) -> Option<Self> {
        match name {
            ".git" => Some(Self::Git),
            ".hg" => Some(Self::Mercurial),
            ".svn" => Some(Self::Subversion),
            _ => None,
        }
    }
}

/// A repository root discovered during the walk.
#[derive(Debug, Clone)]
pub struct RepoMarker {
    /// Repository root, relative to the scan root (empty for the root
    /// itself).
    pub root: PathBuf,
    /// Marker kind found in the root.
    pub vcs: VcsKind,
}

/// Output of one walk: records, repository boundaries, and issues.
#[derive(Debug)]
pub struct WalkOutput {
    /// File records sorted by relative path.
    pub files: Vec<FileRecord>,
    /// Repository roots sorted by path depth, shallowest first.
    pub repositories: Vec<RepoMarker>,
    /// Non-fatal issues accumulated during the walk.
    pub issues: Vec<ScanIssue>,
    /// Directories visited.
    pub total_dirs: u64,
    /// Files whose content was hashed this run.
    pub files_hashed: u64,
    /// Files whose content fields were reused from the prior scan.
    pub files_reused: u64,
    /// False when the walk was cancelled before finishing.
    pub complete: bool,
}

/// One listed entry awaiting extraction.
struct Candidate {
    abs: PathBuf,
    rel: PathBuf,
    size: u64,
    modified: std::time::SystemTime,
    created: Option<std::time::SystemTime>,
}

/// Parallel scanner over a directory tree.
pub struct Walker {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl Walker {
    /// Create a new walker.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(256);
        Self { progress_tx }
    }

    /// Subscribe to per-file progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk a root and extract a record per file.
    ///
    /// A missing or inaccessible root is fatal; every other failure is
    /// recorded as an issue and the walk continues.
    pub fn walk(
        &self,
        root: &Path,
        profile: &Profile,
        prior: Option<&PriorIndex>,
        cancel: &CancelToken,
    ) -> Result<WalkOutput, EngineError> {
        let start = Instant::now();
        let root = root
            .canonicalize()
            .map_err(|e| EngineError::root_io(root, e))?;
        if !root.is_dir() {
            return Err(EngineError::RootNotADirectory { path: root });
        }
        debug!(root = %root.display(), "starting walk");

        let (candidates, repositories, mut issues, total_dirs, listed_all) =
            self.list_entries(&root, profile, cancel);

        let files_processed = AtomicU64::new(0);
        let bytes_hashed = AtomicU64::new(0);
        let hashed = AtomicU64::new(0);
        let reused = AtomicU64::new(0);
        // Seeded with listing issues so snapshots carry the running total.
        let issue_count = AtomicU64::new(issues.len() as u64);

        let extract_all = |candidates: &[Candidate]| -> Vec<(FileRecord, Option<ScanIssue>)> {
            candidates
                .par_iter()
                .filter_map(|candidate| {
                    // Cooperative cancellation between file boundaries.
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let out = extract_record(
                        &candidate.abs,
                        &candidate.rel,
                        candidate.size,
                        candidate.modified,
                        candidate.created,
                        profile,
                        prior,
                    );
                    if out.reused {
                        reused.fetch_add(1, Ordering::Relaxed);
                    } else if out.record.hash.is_some() {
                        hashed.fetch_add(1, Ordering::Relaxed);
                        bytes_hashed.fetch_add(out.record.size, Ordering::Relaxed);
                    }
                    let issues_so_far = if out.issue.is_some() {
                        issue_count.fetch_add(1, Ordering::Relaxed) + 1
                    } else {
                        issue_count.load(Ordering::Relaxed)
                    };
                    let processed = files_processed.fetch_add(1, Ordering::Relaxed) + 1;
                    let _ = self.progress_tx.send(ScanProgress {
                        files_processed: processed,
                        dirs_scanned: total_dirs,
                        bytes_hashed: bytes_hashed.load(Ordering::Relaxed),
                        current_path: candidate.rel.clone(),
                        issue_count: issues_so_far,
                        elapsed: start.elapsed(),
                    });
                    Some((out.record, out.issue))
                })
                .collect()
        };

        let extracted = if profile.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(profile.threads)
                .build()
                .map_err(|e| EngineError::InvalidProfile {
                    message: format!("could not build worker pool: {e}"),
                })?;
            pool.install(|| extract_all(&candidates))
        } else {
            extract_all(&candidates)
        };

        let complete = listed_all && !cancel.is_cancelled();
        let mut files = Vec::with_capacity(extracted.len());
        for (record, issue) in extracted {
            files.push(record);
            if let Some(issue) = issue {
                issues.push(issue);
            }
        }

        // Deterministic ordering regardless of worker interleaving.
        files.sort_by(|a, b| a.path.cmp(&b.path));
        issues.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            files = files.len(),
            repos = repositories.len(),
            issues = issues.len(),
            complete,
            "walk finished"
        );

        Ok(WalkOutput {
            files,
            repositories,
            issues,
            total_dirs,
            files_hashed: hashed.into_inner(),
            files_reused: reused.into_inner(),
            complete,
        })
    }

    /// Depth-first listing pass. Returns candidates, repository markers,
    /// listing issues, the directory count, and whether listing ran to
    /// completion.
    fn list_entries(
        &self,
        root: &Path,
        profile: &Profile,
        cancel: &CancelToken,
    ) -> (Vec<Candidate>, Vec<RepoMarker>, Vec<ScanIssue>, u64, bool) {
        let parallelism = match profile.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        // Repository markers observed by the listing threads.
        let repo_roots: Arc<DashSet<(PathBuf, VcsKind)>> = Arc::new(DashSet::new());
        let excluded_dirs = profile.excluded_dirs.clone();

        let marker_sink = Arc::clone(&repo_roots);
        let walker = WalkDir::new(root)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(profile.follow_symlinks)
            .process_read_dir(move |_depth, dir_path, _state, children| {
                // Note repository markers, then prune them and excluded
                // directories from traversal.
                for child in children.iter().flatten() {
                    if let Some(vcs) = child.file_name.to_str().and_then(VcsKind::from_marker) {
                        marker_sink.insert((dir_path.to_path_buf(), vcs));
                    }
                }
                children.retain(|entry| match entry {
                    Ok(entry) => {
                        let Some(name) = entry.file_name.to_str() else {
                            return true;
                        };
                        let prune = entry.file_type.is_dir()
                            && (VcsKind::from_marker(name).is_some()
                                || excluded_dirs.iter().any(|d| d == name));
                        !prune
                    }
                    Err(_) => true,
                });
            });

        let mut candidates = Vec::new();
        let mut issues = Vec::new();
        let mut total_dirs: u64 = 0;
        let mut listed_all = true;

        for entry_result in walker {
            if cancel.is_cancelled() {
                listed_all = false;
                break;
            }
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| relative_to(p, root))
                        .unwrap_or_default();
                    let kind = if err.io_error().map(std::io::Error::kind)
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        IssueKind::PermissionDenied
                    } else {
                        IssueKind::ReadError
                    };
                    issues.push(ScanIssue::new(path, err.to_string(), kind));
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                total_dirs += 1;
                continue;
            }
            // Symlinked files are skipped unless the walk follows links, in
            // which case jwalk already presents the target's type.
            if file_type.is_symlink() {
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let abs = entry.path();
            let rel = relative_to(&abs, root);
            match entry.metadata() {
                Ok(meta) => candidates.push(Candidate {
                    size: meta.len(),
                    modified: meta.modified().unwrap_or(std::time::UNIX_EPOCH),
                    created: meta.created().ok(),
                    abs,
                    rel,
                }),
                Err(err) => {
                    issues.push(ScanIssue::new(
                        rel,
                        format!("metadata error: {err}"),
                        IssueKind::MetadataError,
                    ));
                }
            }
        }

        let mut repositories: Vec<RepoMarker> = repo_roots
            .iter()
            .map(|item| {
                let (path, vcs) = item.key().clone();
                RepoMarker {
                    root: relative_to(&path, root),
                    vcs,
                }
            })
            .collect();
        repositories.sort_by(|a, b| {
            a.root
                .components()
                .count()
                .cmp(&b.root.components().count())
                .then_with(|| a.root.cmp(&b.root))
        });

        (candidates, repositories, issues, total_dirs, listed_all)
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

/// Path relative to the scan root; empty for the root itself.
fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Find the closest-ancestor repository root for a relative file path.
///
/// Repository roots are relative to the scan root; an empty root matches
/// everything. Nested repositories win over their ancestors.
pub fn closest_repository<'a>(roots: &'a [PathBuf], rel_path: &Path) -> Option<&'a PathBuf> {
    roots
        .iter()
        .filter(|root| root.as_os_str().is_empty() || rel_path.starts_with(root))
        .max_by_key(|root| root.components().count())
}
