//! Analysis algorithms for the folio engine.
//!
//! This crate derives higher-level findings from scanned file records:
//!
//! - **Duplicate detection** - Group byte-identical files by content hash
//! - **Git history** - Commit counts, contributors, timeline, project type
//! - **Skill evidence** - Pattern-based detection of programming techniques
//! - **Contribution** - Per-project shares, activity breakdown, ranking
//!
//! # Duplicate Detection
//!
//! ```rust,ignore
//! use folio_analyze::DuplicateDetector;
//!
//! let groups = DuplicateDetector::new(1).detect(&result.files);
//! for group in &groups {
//!     println!("{} copies, {} bytes wasted", group.count(), group.wasted_bytes);
//! }
//! ```
//!
//! # Git History
//!
//! ```rust,ignore
//! use folio_analyze::GitAnalyzer;
//!
//! let record = GitAnalyzer::new().analyze(&workdir, &rel_root)?;
//! println!("{} commits by {} contributors", record.commit_count, record.contributor_count());
//! ```
//!
//! # Skill Evidence
//!
//! ```rust,ignore
//! use folio_analyze::SkillAnalyzer;
//!
//! let skills = SkillAnalyzer::new().analyze_files(&root, &result.files);
//! for skill in &skills {
//!     println!("{}: {:.1}", skill.name, skill.proficiency);
//! }
//! ```

mod contribution;
mod duplicates;
mod git;
mod skills;

pub use contribution::{
    ActivityBreakdown, ActivityKind, ContributionAggregator, ContributionConfig,
    ContributionConfigBuilder, ContributionReport, RankWeights, classify_activity,
};
pub use duplicates::DuplicateDetector;
pub use git::{GitAnalyzer, GitConfig, GitConfigBuilder, RepoError};
pub use skills::{RULES, SkillAnalyzer, SkillRule, collect_skills};

// Re-export core types callers pair with the analyzers.
pub use folio_core::{
    ContentHash, ContributorRecord, DuplicateGroup, FileRecord, Identity, ProjectType,
    RepositoryRecord, Skill, SkillCategory, SkillEvidence, TimelineBucket,
};
