//! Configuration loading and management
//!
//! Handles parsing of `.plsync.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Task file configuration
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            tasks: TasksConfig::default(),
        }
    }
}

/// Cache file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path to the cache document, relative to the working directory
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Lock timeout for mutating operations, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".claude/plane-sync.json")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Task file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Directory holding task markdown files
    #[serde(default = "default_tasks_dir")]
    pub dir: PathBuf,
}

fn default_tasks_dir() -> PathBuf {
    PathBuf::from("sessions/tasks")
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            dir: default_tasks_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a `.plsync.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(".plsync.toml");
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.cache.path.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "cache.path cannot be empty".to_string(),
            ));
        }
        if self.cache.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "cache.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.tasks.dir.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.dir cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
