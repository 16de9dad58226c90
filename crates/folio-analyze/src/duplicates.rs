//! Duplicate detection over extracted file records.
//!
//! Files were already hashed by the extractor, so grouping is a pure pass
//! over the record set: no re-reading, byte-identical content only.

use std::collections::HashMap;

use folio_core::{ContentHash, DuplicateGroup, FileRecord};

/// Groups files sharing an identical content hash.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    /// Minimum member size in bytes. Zero-byte files are always excluded.
    min_size: u64,
}

impl DuplicateDetector {
    /// Create a detector with the given minimum member size.
    pub fn new(min_size: u64) -> Self {
        Self {
            min_size: min_size.max(1),
        }
    }

    /// Group records by content hash.
    ///
    /// Excluded, errored, and unhashed records never join a group. Output
    /// ordering is deterministic: descending wasted bytes, ties broken by
    /// hash, members sorted by path.
    pub fn detect(&self, files: &[FileRecord]) -> Vec<DuplicateGroup> {
        let mut by_hash: HashMap<ContentHash, (u64, Vec<&FileRecord>)> = HashMap::new();

        for record in files {
            if !record.is_analyzable() || record.size < self.min_size {
                continue;
            }
            let Some(hash) = record.hash else { continue };
            by_hash
                .entry(hash)
                .or_insert_with(|| (record.size, Vec::new()))
                .1
                .push(record);
        }

        let mut groups: Vec<DuplicateGroup> = by_hash
            .into_iter()
            .filter(|(_, (_, members))| members.len() >= 2)
            .map(|(hash, (size, members))| {
                let mut paths: Vec<_> = members.iter().map(|r| r.path.clone()).collect();
                paths.sort();
                let wasted_bytes = size * (paths.len() as u64 - 1);
                DuplicateGroup {
                    hash,
                    size,
                    paths,
                    wasted_bytes,
                }
            })
            .collect();

        groups.sort_by(|a, b| {
            b.wasted_bytes
                .cmp(&a.wasted_bytes)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        groups
    }

    /// Total reclaimable bytes across groups.
    pub fn total_wasted(groups: &[DuplicateGroup]) -> u64 {
        groups.iter().map(|g| g.wasted_bytes).sum()
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(1)
    }
}
