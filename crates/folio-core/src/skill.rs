//! Skill evidence records and the proficiency formula.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Skill category a detection rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ObjectOriented,
    DataStructures,
    Algorithms,
    DesignPatterns,
    EngineeringPractices,
}

/// A single piece of evidence that a skill is demonstrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEvidence {
    /// Skill name this evidence supports.
    pub skill: String,
    /// Category of the skill.
    pub category: SkillCategory,
    /// File the evidence was found in, relative to the scan root.
    pub source: PathBuf,
    /// Line number where the rule fired, when known.
    pub line: Option<u32>,
    /// Fixed confidence weight of the rule, in [0, 1].
    pub confidence: f64,
    /// Human-readable description of what was detected.
    pub description: String,
}

/// A skill with its accumulated evidence and derived proficiency.
///
/// A skill with zero evidence is never emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name.
    pub name: String,
    /// Category.
    pub category: SkillCategory,
    /// Evidence accumulated across files.
    pub evidence: Vec<SkillEvidence>,
    /// Derived proficiency score in [0, 1].
    pub proficiency: f64,
}

impl Skill {
    /// Build a skill from accumulated evidence.
    pub fn from_evidence(name: String, category: SkillCategory, evidence: Vec<SkillEvidence>) -> Self {
        let proficiency = proficiency_score(evidence.len());
        Self {
            name,
            category,
            evidence,
            proficiency,
        }
    }
}

/// Proficiency from an evidence count: min(1.0, n * 0.2 + 0.2).
///
/// Monotonically increasing and saturating at 1.0 once n >= 4. An auditable
/// function, deliberately not a trained model.
pub fn proficiency_score(evidence_count: usize) -> f64 {
    (evidence_count as f64 * 0.2 + 0.2).min(1.0)
}
