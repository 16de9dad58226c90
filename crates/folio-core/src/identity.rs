//! Contributor identity resolution.
//!
//! Both project-type classification and the contribution aggregator match
//! identities through this module so the two never disagree. An identity is
//! the exact (name, email) pair as recorded in the commit log; the same
//! person committing under different pairs stays distinct. This is a
//! documented limitation, not a bug to silently merge away.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A contributor identity as recorded in commit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    /// Author name exactly as recorded.
    pub name: CompactString,
    /// Author email exactly as recorded.
    pub email: CompactString,
}

impl Identity {
    /// Create a new identity.
    pub fn new(name: impl Into<CompactString>, email: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Match against another identity.
    ///
    /// Emails compare case-insensitively (the local part of an address is
    /// case-sensitive per RFC but no mail host treats it that way); names
    /// compare exactly.
    pub fn matches(&self, other: &Identity) -> bool {
        self.name == other.name && self.email.eq_ignore_ascii_case(&other.email)
    }
}
