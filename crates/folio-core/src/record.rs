//! Per-file artifact record types.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// BLAKE3 content hash used for duplicate detection and incremental reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Broad artifact type, determined by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Code,
    Document,
    Image,
    Audio,
    Video,
    Archive,
    Other,
}

impl FileCategory {
    /// Classify an extension (lowercase, without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "rs" | "py" | "js" | "jsx" | "ts" | "tsx" | "java" | "c" | "h" | "cpp" | "cc"
            | "hpp" | "cs" | "go" | "rb" | "php" | "swift" | "kt" | "kts" | "scala" | "sh"
            | "bash" | "zsh" | "pl" | "lua" | "r" | "sql" | "html" | "htm" | "css" | "scss"
            | "vue" | "svelte" | "dart" | "ex" | "exs" | "hs" | "ml" | "clj" | "zig" | "json"
            | "yaml" | "yml" | "toml" | "xml" => Self::Code,
            "md" | "markdown" | "txt" | "rst" | "adoc" | "tex" | "pdf" | "doc" | "docx"
            | "odt" | "rtf" | "csv" | "tsv" => Self::Document,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" | "ico" | "tiff"
            | "heic" => Self::Image,
            "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" | "opus" => Self::Audio,
            "mp4" | "mkv" | "avi" | "mov" | "webm" | "wmv" | "m4v" => Self::Video,
            "zip" | "tar" | "gz" | "bz2" | "xz" | "zst" | "7z" | "rar" | "jar" => Self::Archive,
            _ => Self::Other,
        }
    }
}

/// Type-specific metadata gathered opportunistically.
///
/// Every field is optional: a failed parse degrades that field to `None`
/// rather than failing the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Word count for text and document files.
    pub word_count: Option<u64>,
    /// Pixel dimensions (width, height) for images.
    pub dimensions: Option<(u32, u32)>,
    /// Playback duration in seconds for audio/video.
    pub duration_secs: Option<f64>,
}

impl Enrichment {
    /// True if no enrichment data could be gathered.
    pub fn is_empty(&self) -> bool {
        self.word_count.is_none() && self.dimensions.is_none() && self.duration_secs.is_none()
    }
}

/// A single scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scan root. Unique within one `ScanResult`.
    pub path: PathBuf,

    /// Artifact type category.
    pub category: FileCategory,

    /// Size in bytes.
    pub size: u64,

    /// Creation time (platform-dependent, not always available).
    pub created: Option<SystemTime>,

    /// Last modification time.
    pub modified: SystemTime,

    /// Content hash. Present only when the file was read in full.
    pub hash: Option<ContentHash>,

    /// Detected language for code files.
    pub language: Option<Language>,

    /// Excluded by profile rules (extension filter or size ceiling).
    /// Excluded files never contribute skill evidence or duplicates.
    pub excluded: bool,

    /// A read error occurred; the record carries metadata only.
    pub errored: bool,

    /// Opportunistic type-specific metadata.
    pub enrichment: Enrichment,
}

impl FileRecord {
    /// Create a record with metadata only, no content-derived fields.
    pub fn new(
        path: impl Into<PathBuf>,
        category: FileCategory,
        size: u64,
        modified: SystemTime,
        created: Option<SystemTime>,
    ) -> Self {
        Self {
            path: path.into(),
            category,
            size,
            created,
            modified,
            hash: None,
            language: None,
            excluded: false,
            errored: false,
            enrichment: Enrichment::default(),
        }
    }

    /// Whether this record participates in content analyses.
    pub fn is_analyzable(&self) -> bool {
        !self.excluded && !self.errored && self.hash.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_category_from_extension() {
        assert_eq!(FileCategory::from_extension("rs"), FileCategory::Code);
        assert_eq!(FileCategory::from_extension("md"), FileCategory::Document);
        assert_eq!(FileCategory::from_extension("png"), FileCategory::Image);
        assert_eq!(FileCategory::from_extension("tar"), FileCategory::Archive);
        assert_eq!(FileCategory::from_extension("xyz"), FileCategory::Other);
    }

    #[test]
    fn test_record_analyzable() {
        let mut record = FileRecord::new(
            "src/main.rs",
            FileCategory::Code,
            120,
            SystemTime::now(),
            None,
        );
        assert!(!record.is_analyzable());

        record.hash = Some(ContentHash::new([0; 32]));
        assert!(record.is_analyzable());

        record.excluded = true;
        assert!(!record.is_analyzable());
    }
}
