//! Prior-scan index for incremental re-scans.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use folio_core::{ContentHash, Enrichment, Language, ScanResult};

/// Content-derived fields carried over from a prior scan.
#[derive(Debug, Clone)]
pub struct PriorEntry {
    pub size: u64,
    pub modified: SystemTime,
    pub hash: ContentHash,
    pub language: Option<Language>,
    pub enrichment: Enrichment,
}

/// Index over a prior `ScanResult`, keyed by relative path.
///
/// A file whose (size, modification time) is unchanged reuses the prior hash
/// and enrichment instead of being re-read; any mismatch forces a re-hash.
#[derive(Debug, Default)]
pub struct PriorIndex {
    entries: HashMap<PathBuf, PriorEntry>,
}

impl PriorIndex {
    /// Build an index from a prior scan result. Excluded and errored records
    /// carry no reusable content fields and are skipped.
    pub fn from_result(prior: &ScanResult) -> Self {
        let entries = prior
            .files
            .iter()
            .filter_map(|record| {
                let hash = record.hash?;
                if record.excluded || record.errored {
                    return None;
                }
                Some((
                    record.path.clone(),
                    PriorEntry {
                        size: record.size,
                        modified: record.modified,
                        hash,
                        language: record.language,
                        enrichment: record.enrichment,
                    },
                ))
            })
            .collect();
        Self { entries }
    }

    /// Look up a reusable entry for an unchanged file.
    pub fn lookup(&self, path: &Path, size: u64, modified: SystemTime) -> Option<&PriorEntry> {
        self.entries
            .get(path)
            .filter(|e| e.size == size && e.modified == modified)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
