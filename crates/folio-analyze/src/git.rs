//! Git repository history analysis.
//!
//! Reads the commit log once, in a single bounded-memory pass, attributing
//! each commit to the (name, email) identity exactly as recorded. The same
//! person committing under different pairs stays distinct.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use derive_builder::Builder;
use git2::{BranchType, ErrorCode, Repository, Sort};
use thiserror::Error;
use tracing::debug;

use folio_core::{
    ContributorRecord, Identity, Language, ProjectType, RepositoryRecord, TimelineBucket,
};

/// Per-repository analysis errors. These never abort the overall scan; the
/// caller records them as issues and moves on.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The path is not a git repository.
    #[error("not a repository: {path}")]
    NotARepository { path: PathBuf },

    /// The history exists but could not be read.
    #[error("corrupted history at {path}: {source}")]
    CorruptHistory {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// A recognized non-git VCS marker; history analysis is git-only.
    #[error("unsupported version control system at {path}")]
    UnsupportedVcs { path: PathBuf },
}

/// Configuration for git history analysis.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct GitConfig {
    /// Most recent commit messages kept per monthly bucket.
    #[builder(default = "5")]
    pub messages_per_bucket: usize,

    /// Most frequently touched files kept per monthly bucket.
    #[builder(default = "5")]
    pub files_per_bucket: usize,

    /// Languages kept per monthly bucket histogram.
    #[builder(default = "5")]
    pub languages_per_bucket: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            messages_per_bucket: 5,
            files_per_bucket: 5,
            languages_per_bucket: 5,
        }
    }
}

impl GitConfig {
    /// Create a new config builder.
    pub fn builder() -> GitConfigBuilder {
        GitConfigBuilder::default()
    }
}

struct ContributorAccum {
    commit_count: u64,
    first_commit: DateTime<Utc>,
    last_commit: DateTime<Utc>,
    days: HashSet<NaiveDate>,
}

#[derive(Default)]
struct BucketAccum {
    commit_count: u64,
    messages: Vec<String>,
    files: HashMap<String, u64>,
    languages: HashMap<&'static str, u64>,
    contributors: HashSet<Identity>,
}

/// Single-pass git history analyzer.
pub struct GitAnalyzer {
    config: GitConfig,
}

impl GitAnalyzer {
    /// Create an analyzer with default config.
    pub fn new() -> Self {
        Self {
            config: GitConfig::default(),
        }
    }

    /// Create an analyzer with custom config.
    pub fn with_config(config: GitConfig) -> Self {
        Self { config }
    }

    /// Analyze the repository at `workdir`, recording `rel_root` as its
    /// root in the produced record.
    pub fn analyze(
        &self,
        workdir: &Path,
        rel_root: impl Into<PathBuf>,
    ) -> Result<RepositoryRecord, RepoError> {
        let rel_root = rel_root.into();
        debug!(path = %workdir.display(), "opening repository");

        let repo = Repository::open(workdir).map_err(|_| RepoError::NotARepository {
            path: workdir.to_path_buf(),
        })?;

        let branches = list_branches(&repo);

        let mut walk = repo.revwalk().map_err(|e| self.corrupt(workdir, e))?;
        walk.set_sorting(Sort::TIME)
            .map_err(|e| self.corrupt(workdir, e))?;
        match walk.push_head() {
            Ok(()) => {}
            // An unborn branch is an empty history, not a corrupt one.
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                let mut record = RepositoryRecord::empty(rel_root);
                record.branches = branches;
                return Ok(record);
            }
            Err(e) => return Err(self.corrupt(workdir, e)),
        }

        let mut contributors: HashMap<Identity, ContributorAccum> = HashMap::new();
        let mut buckets: BTreeMap<(i32, u32), BucketAccum> = BTreeMap::new();
        let mut commit_count: u64 = 0;
        let mut first_commit: Option<DateTime<Utc>> = None;
        let mut last_commit: Option<DateTime<Utc>> = None;

        for oid in walk {
            let oid = oid.map_err(|e| self.corrupt(workdir, e))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| self.corrupt(workdir, e))?;

            let author = commit.author();
            let identity = Identity::new(
                String::from_utf8_lossy(author.name_bytes()).into_owned(),
                String::from_utf8_lossy(author.email_bytes()).into_owned(),
            );
            let when = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
                .unwrap_or(DateTime::UNIX_EPOCH);

            commit_count += 1;
            first_commit = Some(first_commit.map_or(when, |f: DateTime<Utc>| f.min(when)));
            last_commit = Some(last_commit.map_or(when, |l: DateTime<Utc>| l.max(when)));

            let accum = contributors
                .entry(identity.clone())
                .or_insert_with(|| ContributorAccum {
                    commit_count: 0,
                    first_commit: when,
                    last_commit: when,
                    days: HashSet::new(),
                });
            accum.commit_count += 1;
            accum.first_commit = accum.first_commit.min(when);
            accum.last_commit = accum.last_commit.max(when);
            accum.days.insert(when.date_naive());

            let bucket = buckets.entry((when.year(), when.month())).or_default();
            bucket.commit_count += 1;
            bucket.contributors.insert(identity);
            // Time-sorted walk visits newest first, so the first messages
            // seen per bucket are the most recent ones.
            if bucket.messages.len() < self.config.messages_per_bucket {
                if let Some(summary) = commit.summary() {
                    bucket.messages.push(summary.to_string());
                }
            }

            for path in touched_paths(&repo, &commit) {
                if let Some(lang) = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(|e| Language::from_extension(&e.to_ascii_lowercase()))
                {
                    *bucket.languages.entry(lang.name()).or_default() += 1;
                }
                *bucket
                    .files
                    .entry(path.to_string_lossy().into_owned())
                    .or_default() += 1;
            }
        }

        let mut contributors: Vec<ContributorRecord> = contributors
            .into_iter()
            .map(|(identity, accum)| ContributorRecord {
                identity,
                commit_count: accum.commit_count,
                first_commit: accum.first_commit,
                last_commit: accum.last_commit,
                active_days: accum.days.len() as u64,
            })
            .collect();
        contributors.sort_by(|a, b| {
            b.commit_count
                .cmp(&a.commit_count)
                .then_with(|| a.identity.cmp(&b.identity))
        });

        let project_type = ProjectType::from_contributor_count(contributors.len());

        let timeline = buckets
            .into_iter()
            .map(|((year, month), accum)| TimelineBucket {
                year,
                month,
                commit_count: accum.commit_count,
                sample_messages: accum.messages,
                top_files: top_counts(accum.files, self.config.files_per_bucket),
                languages: top_counts(
                    accum
                        .languages
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect(),
                    self.config.languages_per_bucket,
                ),
                contributor_count: accum.contributors.len() as u64,
            })
            .collect();

        debug!(
            commits = commit_count,
            contributors = contributors.len(),
            "repository analyzed"
        );

        Ok(RepositoryRecord {
            root: rel_root,
            commit_count,
            first_commit,
            last_commit,
            branches,
            contributors,
            timeline,
            project_type,
        })
    }

    fn corrupt(&self, path: &Path, source: git2::Error) -> RepoError {
        RepoError::CorruptHistory {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Default for GitAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn list_branches(repo: &Repository) -> Vec<String> {
    let mut names: Vec<String> = repo
        .branches(Some(BranchType::Local))
        .map(|branches| {
            branches
                .flatten()
                .filter_map(|(branch, _)| branch.name().ok().flatten().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Paths touched by a commit, diffed against its first parent. Root commits
/// diff against the empty tree.
fn touched_paths(repo: &Repository, commit: &git2::Commit) -> Vec<PathBuf> {
    let Ok(tree) = commit.tree() else {
        return Vec::new();
    };
    let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());
    let Ok(diff) = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None) else {
        return Vec::new();
    };
    diff.deltas()
        .filter_map(|delta| delta.new_file().path().map(Path::to_path_buf))
        .collect()
}

/// Descending (item, count) list, ties broken by name, truncated to `limit`.
fn top_counts(map: HashMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = map.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(limit);
    counts
}
