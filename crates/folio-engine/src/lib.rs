//! Top-level orchestration for the folio analysis engine.
//!
//! An [`Engine`] drives one scan invocation end to end: the parallel walk
//! and per-file extraction, git history analysis per discovered repository,
//! duplicate grouping, and skill evidence collection, assembled into one
//! immutable [`ScanResult`].
//!
//! ```rust,ignore
//! use folio_engine::{CancelToken, Engine, Profile};
//!
//! let engine = Engine::new(Profile::default());
//! let cancel = CancelToken::new();
//!
//! let mut progress = engine.subscribe();
//! let result = engine.scan("/path/to/portfolio".as_ref(), &cancel)?;
//!
//! println!("{} files, {} repositories", result.summary.total_files,
//!          result.summary.repository_count);
//!
//! // Later: cheap re-scan reusing unchanged content.
//! let fresh = engine.rescan("/path/to/portfolio".as_ref(), &result, &cancel)?;
//! ```

mod engine;

pub use engine::Engine;

// The full surface callers need to drive a scan and read its output.
pub use folio_analyze::{
    ContributionAggregator, ContributionConfig, ContributionReport, DuplicateDetector,
    GitAnalyzer, GitConfig, RankWeights, RepoError, SkillAnalyzer,
};
pub use folio_core::{
    ContentHash, ContributorRecord, DuplicateGroup, EngineError, FileCategory, FileRecord,
    Identity, IssueKind, Language, Profile, ProjectType, RepositoryRecord, ScanIssue, ScanResult,
    ScanSummary, Skill, SkillCategory, SkillEvidence, TimelineBucket,
};
pub use folio_scan::{CancelToken, ScanProgress, Walker};
