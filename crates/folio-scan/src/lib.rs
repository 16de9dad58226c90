//! Directory walking and metadata extraction for the folio analysis engine.
//!
//! A jwalk producer lists entries and per-file extraction runs across a
//! rayon worker pool: streaming BLAKE3 hashing, type classification,
//! language detection, and opportunistic enrichment. Repository boundaries
//! are detected during the walk for downstream git analysis.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_scan::{CancelToken, Walker};
//! use folio_core::Profile;
//!
//! let walker = Walker::new();
//! let out = walker
//!     .walk("/path/to/scan".as_ref(), &Profile::default(), None, &CancelToken::new())
//!     .unwrap();
//!
//! println!("{} files, {} repositories", out.files.len(), out.repositories.len());
//! ```

mod language;
mod metadata;
mod prior;
mod progress;
mod walker;

pub use language::sniff_language;
pub use metadata::{Extraction, extension_of, extract_record};
pub use prior::{PriorEntry, PriorIndex};
pub use progress::{CancelToken, ScanProgress};
pub use walker::{RepoMarker, VcsKind, WalkOutput, Walker, closest_repository};

// Re-export core types for convenience
pub use folio_core::{EngineError, FileRecord, Profile, ScanIssue};
