//! Scan profile: a named bundle of scan preferences.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Preferences controlling what a scan includes and how files are read.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Profile {
    /// Profile name.
    #[builder(default = "String::from(\"default\")")]
    #[serde(default = "default_name")]
    pub name: String,

    /// Extension allow-list, lowercase without dots. Empty means all
    /// extensions are allowed.
    #[builder(default)]
    #[serde(default)]
    pub allowed_extensions: Vec<String>,

    /// Directory names skipped entirely during the walk.
    #[builder(default = "Profile::default_excluded_dirs()")]
    #[serde(default = "Profile::default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Files larger than this are recorded as issues and never read.
    #[builder(default = "100 * 1024 * 1024")]
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Follow symlinked directories. Off by default to prevent cycles.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Minimum file size considered by duplicate detection. Zero-byte files
    /// are always excluded.
    #[builder(default = "1")]
    #[serde(default = "default_min_duplicate_size")]
    pub min_duplicate_size: u64,

    /// Worker threads for extraction (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

fn default_min_duplicate_size() -> u64 {
    1
}

impl ProfileBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_file_size {
            if max == 0 {
                return Err("max_file_size must be greater than zero".to_string());
            }
        }
        Ok(())
    }
}

impl Profile {
    /// Create a new profile builder.
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    /// Directory names excluded by default.
    pub fn default_excluded_dirs() -> Vec<String> {
        ["node_modules", "target", ".venv", "venv", "__pycache__", ".cache", "dist", "build"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Check whether an extension passes the allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.is_empty()
            || self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    /// Check whether a directory name is excluded from the walk.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: default_name(),
            allowed_extensions: Vec::new(),
            excluded_dirs: Self::default_excluded_dirs(),
            max_file_size: default_max_file_size(),
            follow_symlinks: false,
            min_duplicate_size: default_min_duplicate_size(),
            threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let profile = Profile::builder()
            .allowed_extensions(vec!["rs".to_string(), "py".to_string()])
            .max_file_size(1024u64)
            .build()
            .unwrap();

        assert!(profile.allows_extension("rs"));
        assert!(profile.allows_extension("RS"));
        assert!(!profile.allows_extension("js"));
        assert_eq!(profile.max_file_size, 1024);
    }

    #[test]
    fn test_empty_allow_list_allows_all() {
        let profile = Profile::default();
        assert!(profile.allows_extension("rs"));
        assert!(profile.allows_extension("anything"));
    }

    #[test]
    fn test_excluded_dirs() {
        let profile = Profile::default();
        assert!(profile.is_excluded_dir("node_modules"));
        assert!(profile.is_excluded_dir("target"));
        assert!(!profile.is_excluded_dir("src"));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let result = Profile::builder().max_file_size(0u64).build();
        assert!(result.is_err());
    }
}
