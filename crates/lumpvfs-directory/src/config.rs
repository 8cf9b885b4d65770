//! Configuration for the resource directory

use crate::{DirectoryError, Result};
use lumpvfs_cache::ArenaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a [`ResourceDirectory`](crate::ResourceDirectory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Extra directories searched for containers given by relative path
    pub search_paths: Vec<PathBuf>,

    /// Extensions tried, in order, for inexact container names
    pub default_extensions: Vec<String>,

    /// Verify CRC-32 of decoded zip entries
    pub verify_zip_crc: bool,

    /// Byte budget for discardable cache buffers
    pub max_discardable_bytes: Option<usize>,

    /// Load `.wad` files found inside zips as their own containers
    pub load_embedded_archives: bool,

    /// Recursion limit for loose directory containers
    pub max_directory_depth: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            default_extensions: [".wad", ".pke", ".pk3", ".zip", ".lmp"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            verify_zip_crc: true,
            max_discardable_bytes: None,
            load_embedded_archives: true,
            max_directory_depth: 10,
        }
    }
}

impl DirectoryConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DirectoryError::InvalidConfiguration(format!("Invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a directory to the container search path
    #[must_use]
    pub fn with_search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Replace the default extension list
    #[must_use]
    pub fn with_default_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable zip CRC verification
    #[must_use]
    pub const fn with_zip_crc_verification(mut self, enable: bool) -> Self {
        self.verify_zip_crc = enable;
        self
    }

    /// Set the byte budget for discardable cache buffers
    #[must_use]
    pub const fn with_discardable_budget(mut self, bytes: usize) -> Self {
        self.max_discardable_bytes = Some(bytes);
        self
    }

    /// Enable or disable loading WADs embedded in zips
    #[must_use]
    pub const fn with_embedded_archives(mut self, enable: bool) -> Self {
        self.load_embedded_archives = enable;
        self
    }

    /// Set the recursion limit for loose directories
    #[must_use]
    pub const fn with_max_directory_depth(mut self, depth: usize) -> Self {
        self.max_directory_depth = depth;
        self
    }

    /// Arena settings derived from this configuration
    pub fn arena_config(&self) -> ArenaConfig {
        ArenaConfig {
            max_discardable_bytes: self.max_discardable_bytes,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_directory_depth == 0 {
            return Err(DirectoryError::InvalidConfiguration(
                "max_directory_depth must be at least 1".to_string(),
            ));
        }
        if let Some(ext) = self.default_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(DirectoryError::InvalidConfiguration(format!(
                "default extension {ext:?} must start with '.'"
            )));
        }
        self.arena_config()
            .validate()
            .map_err(|e| DirectoryError::InvalidConfiguration(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DirectoryConfig::default();
        assert_eq!(config.default_extensions[0], ".wad");
        assert_eq!(config.max_directory_depth, 10);
        assert!(config.verify_zip_crc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DirectoryConfig::new()
            .with_search_path("/usr/share/games/doom")
            .with_default_extensions([".wad"])
            .with_discardable_budget(1 << 20)
            .with_embedded_archives(false);
        assert_eq!(config.search_paths.len(), 1);
        assert_eq!(config.default_extensions, vec![".wad".to_string()]);
        assert_eq!(config.arena_config().max_discardable_bytes, Some(1 << 20));
        assert!(!config.load_embedded_archives);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let json = r#"{ "search_paths": ["/opt/wads"], "verify_zip_crc": false }"#;
        let config = DirectoryConfig::from_json(json).unwrap();
        assert_eq!(config.search_paths, vec![PathBuf::from("/opt/wads")]);
        assert!(!config.verify_zip_crc);
        assert_eq!(config.max_directory_depth, 10);
    }

    #[test]
    fn test_invalid() {
        assert!(DirectoryConfig::from_json("{ not json").is_err());
        assert!(
            DirectoryConfig::new()
                .with_max_directory_depth(0)
                .validate()
                .is_err()
        );
        assert!(
            DirectoryConfig::new()
                .with_default_extensions(["wad"])
                .validate()
                .is_err()
        );
        assert!(
            DirectoryConfig::new()
                .with_discardable_budget(0)
                .validate()
                .is_err()
        );
    }
}
