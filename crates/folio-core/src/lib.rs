//! Core types for the folio analysis engine.
//!
//! This crate provides the fundamental data structures shared across the
//! folio workspace: file records, repository analysis records, skill
//! evidence, duplicate groups, scan profiles, and the unified scan result.

mod duplicate;
mod error;
mod identity;
mod language;
mod profile;
mod record;
mod repo;
mod result;
mod skill;

pub use duplicate::DuplicateGroup;
pub use error::{EngineError, IssueKind, ScanIssue};
pub use identity::Identity;
pub use language::Language;
pub use profile::{Profile, ProfileBuilder};
pub use record::{ContentHash, Enrichment, FileCategory, FileRecord};
pub use repo::{ContributorRecord, ProjectType, RepositoryRecord, TimelineBucket};
pub use result::{ScanResult, ScanSummary};
pub use skill::{proficiency_score, Skill, SkillCategory, SkillEvidence};
