//! Duplicate file groups.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::record::ContentHash;

/// A group of files sharing identical content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all members.
    pub hash: ContentHash,
    /// Size of each member in bytes.
    pub size: u64,
    /// Paths of all members, relative to the scan root, sorted.
    pub paths: Vec<PathBuf>,
    /// Reclaimable space: size * (member count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Number of members in the group.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// How many members could be deleted keeping one copy.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let group = DuplicateGroup {
            hash: ContentHash::new([1; 32]),
            size: 300,
            paths: vec![PathBuf::from("a.py"), PathBuf::from("b.py")],
            wasted_bytes: 300,
        };
        assert_eq!(group.count(), 2);
        assert_eq!(group.deletable_count(), 1);
    }
}
