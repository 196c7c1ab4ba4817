//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub scan: ScanConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Capacity of every bounded cache (trees, queries, classes, api docs)
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files processed concurrently per batch for parse work
    pub structural_batch_size: usize,
    /// Files processed concurrently per batch for plain text search
    pub text_batch_size: usize,
    /// Files larger than this are skipped by the walker (bytes)
    pub max_file_size: u64,
    /// Glob used to look up classes under an engine root
    pub engine_class_pattern: String,
    /// Glob used to look up classes under a custom codebase
    pub custom_class_pattern: String,
    /// Glob used by the reference finder
    pub reference_pattern: String,
    /// Default glob for text search
    pub search_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory that must exist under an engine root
    pub required_subdir: PathBuf,
    /// Directories scanned right after an engine root is set
    pub default_scan_dirs: Vec<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            structural_batch_size: crate::scan::STRUCTURAL_BATCH_SIZE,
            text_batch_size: crate::scan::TEXT_BATCH_SIZE,
            max_file_size: MAX_FILE_SIZE,
            engine_class_pattern: "**/*.h".to_string(),
            custom_class_pattern: "**/*.{h,hpp,cpp}".to_string(),
            reference_pattern: "**/*.{h,hpp,cpp}".to_string(),
            search_pattern: "**/*.{h,cpp}".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_subdir: PathBuf::from("Engine/Source"),
            default_scan_dirs: vec![
                PathBuf::from("Engine/Source/Runtime/Core"),
                PathBuf::from("Engine/Source/Runtime/CoreUObject"),
                PathBuf::from("Engine/Source/Runtime/Engine"),
            ],
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(Error::ConfigError {
                message: "cache.capacity must be at least 1".to_string(),
            });
        }
        if self.scan.structural_batch_size == 0 || self.scan.text_batch_size == 0 {
            return Err(Error::ConfigError {
                message: "scan batch sizes must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Get the analyzer home directory
    pub fn home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("UNREAL_ANALYZER_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "unreal-analyzer", "unreal-analyzer")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine unreal-analyzer home directory".to_string(),
            })
    }
}

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const MAX_FILE_SIZE: u64 = 4 * 1_048_576; // 4MB

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.scan.structural_batch_size, 10);
        assert_eq!(config.scan.text_batch_size, 20);
        assert_eq!(config.engine.default_scan_dirs.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[scan]\ntext_batch_size = 5\n").unwrap();
        assert_eq!(config.scan.text_batch_size, 5);
        assert_eq!(config.scan.structural_batch_size, 10);
        assert_eq!(config.cache.capacity, 1000);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = Config::from_toml("[cache]\ncapacity = 0\n");
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }
}
