//! Cache document storage
//!
//! The whole mirrored state lives in one JSON document: project descriptor,
//! state-name mapping, issue records keyed by issue key, issue-to-task links,
//! and the last sync timestamp. Every operation materializes the document
//! fresh from disk and rewrites it wholesale on success; nothing is kept in
//! memory across calls.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

fn default_priority() -> String {
    "none".to_string()
}

/// Remote project descriptor, mutated wholesale by sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// A cached remote issue
///
/// `updated_at` is the remote timestamp, kept as an opaque string and used
/// only for equality-based change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub state_id: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub updated_at: Option<String>,
}

/// The persisted cache document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub project: ProjectRecord,

    /// Canonical status (or literal state name) to remote state id
    #[serde(default)]
    pub states: BTreeMap<String, String>,

    /// Issue records keyed by "<IDENTIFIER>-<sequence>"
    #[serde(default)]
    pub issues: BTreeMap<String, IssueRecord>,

    /// Issue key to task file name; injective in both directions
    #[serde(default)]
    pub linked: BTreeMap<String, String>,

    #[serde(rename = "lastSync", default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl CacheDocument {
    /// The fixed empty skeleton returned when no cache file exists yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Task file names currently claimed by a link
    pub fn linked_tasks(&self) -> impl Iterator<Item = &str> {
        self.linked.values().map(String::as_str)
    }

    /// The issue key a task file is linked to, if any
    pub fn issue_for_task(&self, task_file: &str) -> Option<&str> {
        self.linked
            .iter()
            .find(|(_, task)| task.as_str() == task_file)
            .map(|(issue, _)| issue.as_str())
    }
}

/// Load/modify/save unit over the cache document
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>, lock_timeout_ms: u64) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms,
        }
    }

    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DEFAULT_LOCK_TIMEOUT_MS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.lock", self.path.display()))
    }

    /// Load the document, or the empty skeleton when the file does not exist
    ///
    /// A file that exists but does not parse as a cache document fails with
    /// `CorruptCache`.
    pub fn load(&self) -> Result<CacheDocument> {
        if !self.path.exists() {
            return Ok(CacheDocument::empty());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|err| Error::CorruptCache {
            path: self.path.clone(),
            reason: err.to_string(),
        })
    }

    /// Load the document, failing with `CacheNotFound` when absent
    pub fn load_required(&self) -> Result<CacheDocument> {
        if !self.path.exists() {
            return Err(Error::CacheNotFound(self.path.clone()));
        }
        self.load()
    }

    /// Write the full document atomically, creating parent directories
    pub fn save(&self, doc: &CacheDocument) -> Result<()> {
        let mut payload = serde_json::to_string_pretty(doc)?;
        payload.push('\n');
        lock::write_atomic_str(&self.path, &payload)
    }

    /// Run one load-modify-save cycle under the advisory cache lock
    ///
    /// The lock covers the whole cycle and is released on every exit path,
    /// including when `f` or the save fails.
    pub fn update<T>(&self, f: impl FnOnce(&mut CacheDocument) -> Result<T>) -> Result<T> {
        let _lock = FileLock::acquire(self.lock_path(), self.lock_timeout_ms)?;
        let mut doc = self.load()?;
        let value = f(&mut doc)?;
        self.save(&doc)?;
        Ok(value)
    }
}
