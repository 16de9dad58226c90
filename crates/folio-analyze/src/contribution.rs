//! Per-project contribution aggregation and ranking.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use folio_core::{FileCategory, FileRecord, Identity, RepositoryRecord};

/// Activity type a touched file classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Code,
    Test,
    Doc,
    Design,
    Config,
}

/// Counts of files per activity type within one project scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBreakdown {
    pub code: u64,
    pub test: u64,
    pub doc: u64,
    pub design: u64,
    pub config: u64,
}

impl ActivityBreakdown {
    fn record(&mut self, kind: ActivityKind) {
        match kind {
            ActivityKind::Code => self.code += 1,
            ActivityKind::Test => self.test += 1,
            ActivityKind::Doc => self.doc += 1,
            ActivityKind::Design => self.design += 1,
            ActivityKind::Config => self.config += 1,
        }
    }

    /// Total classified files.
    pub fn total(&self) -> u64 {
        self.code + self.test + self.doc + self.design + self.config
    }
}

const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "env", "properties", "lock",
];

const DESIGN_EXTENSIONS: &[&str] = &["drawio", "fig", "sketch", "puml", "svg"];

/// Classify a file into an activity type by extension and path heuristics.
///
/// Paths under a "test"/"spec" segment or matching test-file naming
/// conventions classify as test activity regardless of category.
pub fn classify_activity(path: &Path, category: FileCategory) -> Option<ActivityKind> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if has_segment(path, &["test", "tests", "spec", "specs", "__tests__"])
        || stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
    {
        return Some(ActivityKind::Test);
    }
    if DESIGN_EXTENSIONS.contains(&ext.as_str())
        || has_segment(path, &["design", "designs", "diagrams", "mockups", "wireframes"])
        || category == FileCategory::Image
    {
        return Some(ActivityKind::Design);
    }
    if category == FileCategory::Document || has_segment(path, &["doc", "docs"]) {
        return Some(ActivityKind::Doc);
    }
    if CONFIG_EXTENSIONS.contains(&ext.as_str()) {
        return Some(ActivityKind::Config);
    }
    if category == FileCategory::Code {
        return Some(ActivityKind::Code);
    }
    None
}

fn has_segment(path: &Path, names: &[&str]) -> bool {
    path.components().any(|c| {
        let segment = c.as_os_str().to_string_lossy().to_ascii_lowercase();
        names.contains(&segment.as_str())
    })
}

/// Weights for the project ranking score. Caller-overridable; the score is
/// exactly reproducible given identical weights and inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankWeights {
    pub recency: f64,
    pub volume: f64,
    pub diversity: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            volume: 0.4,
            diversity: 0.2,
        }
    }
}

/// Configuration for contribution aggregation.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ContributionConfig {
    /// The caller's known identity, matched against contributor records.
    #[builder(default)]
    pub caller: Option<Identity>,

    /// Ranking weights.
    #[builder(default)]
    pub weights: RankWeights,

    /// Reference time for the recency component. Fixing it makes the score
    /// reproducible across runs.
    #[builder(default = "Utc::now()")]
    pub reference_time: DateTime<Utc>,
}

impl Default for ContributionConfig {
    fn default() -> Self {
        Self {
            caller: None,
            weights: RankWeights::default(),
            reference_time: Utc::now(),
        }
    }
}

impl ContributionConfig {
    /// Create a new config builder.
    pub fn builder() -> ContributionConfigBuilder {
        ContributionConfigBuilder::default()
    }
}

/// Aggregated contribution metrics for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionReport {
    /// Repository root this report covers.
    pub repo_root: PathBuf,
    /// Total commits in the history.
    pub total_commits: u64,
    /// Distinct contributors.
    pub total_contributors: u64,
    /// The caller's share of commits in [0, 1]. `None` when the caller's
    /// identity matched no contributor; never a false zero.
    pub own_commit_share: Option<f64>,
    /// Activity-type breakdown over files in this project's scope.
    pub activity: ActivityBreakdown,
    /// Ranking score combining recency, volume, and skill diversity.
    pub rank_score: f64,
}

/// Combines git history and file-level metrics into per-project scores.
pub struct ContributionAggregator {
    config: ContributionConfig,
}

impl ContributionAggregator {
    /// Create an aggregator with default config.
    pub fn new() -> Self {
        Self {
            config: ContributionConfig::default(),
        }
    }

    /// Create an aggregator with custom config.
    pub fn with_config(config: ContributionConfig) -> Self {
        Self { config }
    }

    /// Aggregate one repository with the file records attributed to it.
    /// `skill_category_count` is the number of distinct skill categories
    /// evidenced in this scope, feeding the diversity component.
    pub fn aggregate(
        &self,
        repo: &RepositoryRecord,
        files: &[&FileRecord],
        skill_category_count: usize,
    ) -> ContributionReport {
        let mut activity = ActivityBreakdown::default();
        for record in files {
            if record.excluded {
                continue;
            }
            if let Some(kind) = classify_activity(&record.path, record.category) {
                activity.record(kind);
            }
        }

        ContributionReport {
            repo_root: repo.root.clone(),
            total_commits: repo.commit_count,
            total_contributors: repo.contributors.len() as u64,
            own_commit_share: self.own_share(repo),
            activity,
            rank_score: self.rank_score(repo, skill_category_count),
        }
    }

    /// The caller's commit share, via the same identity matching the
    /// project-type classifier uses: exact name, case-insensitive email.
    /// Same-email/different-name contributors stay distinct here too.
    fn own_share(&self, repo: &RepositoryRecord) -> Option<f64> {
        let caller = self.config.caller.as_ref()?;
        if repo.commit_count == 0 {
            return None;
        }
        let own: u64 = repo
            .contributors
            .iter()
            .filter(|c| caller.matches(&c.identity))
            .map(|c| c.commit_count)
            .sum();
        if own == 0 {
            // No contributor matched: unknown, not zero.
            return None;
        }
        Some(own as f64 / repo.commit_count as f64)
    }

    /// Weighted ranking score in [0, 1], deterministic for fixed inputs.
    fn rank_score(&self, repo: &RepositoryRecord, skill_category_count: usize) -> f64 {
        let w = self.config.weights;
        let weight_sum = w.recency + w.volume + w.diversity;
        if weight_sum <= 0.0 {
            return 0.0;
        }

        let recency = repo
            .last_commit
            .map(|last| {
                let days = (self.config.reference_time - last).num_days().max(0) as f64;
                1.0 / (1.0 + days / 365.0)
            })
            .unwrap_or(0.0);
        let volume = ((1.0 + repo.commit_count as f64).ln() / 1001f64.ln()).min(1.0);
        let diversity = (skill_category_count as f64 / 5.0).min(1.0);

        (w.recency * recency + w.volume * volume + w.diversity * diversity) / weight_sum
    }
}

impl Default for ContributionAggregator {
    fn default() -> Self {
        Self::new()
    }
}
