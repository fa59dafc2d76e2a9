//! Issue-task link management
//!
//! Links associate one cached issue key with one local task file name. The
//! mapping is injective in both directions: linking an already-linked issue
//! or an already-claimed task file is refused, and callers must unlink
//! explicitly before re-pointing either side. Re-linking the identical pair
//! is an idempotent confirmation.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{CacheStore, IssueRecord};
use crate::error::{Error, Result};

/// Fields for a manual single-issue upsert
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub state_id: Option<String>,
    pub priority: Option<String>,
    pub updated_at: Option<String>,
}

impl IssueFields {
    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|err| Error::Validation(err.to_string()))
    }
}

/// Whether an upsert created or replaced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Added,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub issue: String,
    pub action: UpsertAction,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub issue: String,
    pub task: String,
    pub issue_name: String,
    /// True when the identical link already existed (no-op confirmation)
    pub already_linked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnlinkOutcome {
    pub issue: String,
    pub was_linked_to: String,
}

/// Insert or replace one issue record
///
/// Requires a non-empty remote id and name. A missing `updated_at` defaults
/// to the current UTC time. Does not refresh `lastSync`; only reconciler
/// calls own that timestamp.
pub fn upsert_issue(store: &CacheStore, key: &str, fields: IssueFields) -> Result<UpsertOutcome> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Validation("issue key cannot be empty".to_string()));
    }
    let id = required(fields.id, "id")?;
    let name = required(fields.name, "name")?;

    store.update(|doc| {
        let action = if doc.issues.contains_key(key) {
            UpsertAction::Updated
        } else {
            UpsertAction::Added
        };

        doc.issues.insert(
            key.to_string(),
            IssueRecord {
                id,
                name: name.clone(),
                state: fields.state.clone(),
                state_id: fields.state_id.clone(),
                priority: fields.priority.clone().unwrap_or_else(|| "none".to_string()),
                updated_at: fields.updated_at.clone().or_else(|| {
                    Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
                }),
            },
        );

        Ok(UpsertOutcome {
            issue: key.to_string(),
            action,
            name: name.clone(),
        })
    })
}

/// Link an issue to a task file, enforcing the bijection
pub fn link(store: &CacheStore, issue_key: &str, task_file: &str) -> Result<LinkOutcome> {
    store.update(|doc| {
        let issue_name = doc
            .issues
            .get(issue_key)
            .map(|issue| issue.name.clone())
            .ok_or_else(|| Error::IssueNotFound(issue_key.to_string()))?;

        if let Some(existing) = doc.linked.get(issue_key) {
            if existing == task_file {
                // Idempotent confirmation
                return Ok(LinkOutcome {
                    issue: issue_key.to_string(),
                    task: task_file.to_string(),
                    issue_name,
                    already_linked: true,
                });
            }
            return Err(Error::IssueAlreadyLinked {
                issue: issue_key.to_string(),
                task: existing.clone(),
            });
        }

        // Global scan keeps the task side of the bijection honest
        if let Some(owner) = doc.issue_for_task(task_file) {
            if owner != issue_key {
                return Err(Error::TaskAlreadyLinked {
                    task: task_file.to_string(),
                    issue: owner.to_string(),
                });
            }
        }

        doc.linked
            .insert(issue_key.to_string(), task_file.to_string());
        debug!(issue = issue_key, task = task_file, "link added");

        Ok(LinkOutcome {
            issue: issue_key.to_string(),
            task: task_file.to_string(),
            issue_name,
            already_linked: false,
        })
    })
}

/// Remove an issue's link, returning the task file it pointed at
pub fn unlink(store: &CacheStore, issue_key: &str) -> Result<UnlinkOutcome> {
    store.update(|doc| {
        let task_file = doc
            .linked
            .remove(issue_key)
            .ok_or_else(|| Error::NotLinked(issue_key.to_string()))?;
        debug!(issue = issue_key, task = %task_file, "link removed");

        Ok(UnlinkOutcome {
            issue: issue_key.to_string(),
            was_linked_to: task_file,
        })
    })
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Validation(format!(
            "Missing required field: {field}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_issues(dir: &TempDir, keys: &[&str]) -> CacheStore {
        let store = CacheStore::with_defaults(dir.path().join("plane-sync.json"));
        store
            .update(|doc| {
                for key in keys {
                    doc.issues.insert(
                        key.to_string(),
                        IssueRecord {
                            id: format!("uuid-{key}"),
                            name: format!("Issue {key}"),
                            state: Some("Todo".to_string()),
                            ..IssueRecord::default()
                        },
                    );
                }
                Ok(())
            })
            .expect("seed");
        store
    }

    #[test]
    fn upsert_reports_added_then_updated() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::with_defaults(dir.path().join("plane-sync.json"));

        let fields = IssueFields {
            id: Some("u1".to_string()),
            name: Some("First".to_string()),
            ..IssueFields::default()
        };
        let outcome = upsert_issue(&store, "CCPRISM-1", fields.clone()).expect("add");
        assert_eq!(outcome.action, UpsertAction::Added);

        let outcome = upsert_issue(&store, "CCPRISM-1", fields).expect("update");
        assert_eq!(outcome.action, UpsertAction::Updated);

        let doc = store.load().expect("load");
        let issue = doc.issues.get("CCPRISM-1").expect("issue");
        assert_eq!(issue.priority, "none");
        assert!(issue.updated_at.is_some());
    }

    #[test]
    fn upsert_requires_id_and_name() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::with_defaults(dir.path().join("plane-sync.json"));

        let err = upsert_issue(
            &store,
            "CCPRISM-1",
            IssueFields {
                name: Some("no id".to_string()),
                ..IssueFields::default()
            },
        )
        .expect_err("missing id");
        assert!(matches!(err, Error::Validation(_)));

        let err = upsert_issue(
            &store,
            "CCPRISM-1",
            IssueFields {
                id: Some("u1".to_string()),
                name: Some("   ".to_string()),
                ..IssueFields::default()
            },
        )
        .expect_err("blank name");
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn link_unknown_issue_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &[]);

        let err = link(&store, "CCPRISM-1", "a.md").expect_err("unknown issue");
        assert!(matches!(err, Error::IssueNotFound(_)));
    }

    #[test]
    fn relink_same_pair_is_noop_confirmation() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1"]);

        let first = link(&store, "CCPRISM-1", "a.md").expect("link");
        assert!(!first.already_linked);
        assert_eq!(first.issue_name, "Issue CCPRISM-1");

        let second = link(&store, "CCPRISM-1", "a.md").expect("relink");
        assert!(second.already_linked);
    }

    #[test]
    fn relink_to_different_task_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1"]);

        link(&store, "CCPRISM-1", "a.md").expect("link");
        let err = link(&store, "CCPRISM-1", "b.md").expect_err("conflict");
        assert!(matches!(err, Error::IssueAlreadyLinked { .. }));
    }

    #[test]
    fn claimed_task_file_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1", "CCPRISM-2"]);

        link(&store, "CCPRISM-1", "a.md").expect("link");
        let err = link(&store, "CCPRISM-2", "a.md").expect_err("conflict");
        match err {
            Error::TaskAlreadyLinked { task, issue } => {
                assert_eq!(task, "a.md");
                assert_eq!(issue, "CCPRISM-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unlink_returns_removed_task() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1"]);
        link(&store, "CCPRISM-1", "a.md").expect("link");

        let outcome = unlink(&store, "CCPRISM-1").expect("unlink");
        assert_eq!(outcome.was_linked_to, "a.md");

        let doc = store.load().expect("load");
        assert!(doc.linked.is_empty());
    }

    #[test]
    fn unlink_never_linked_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1"]);

        let err = unlink(&store, "CCPRISM-1").expect_err("never linked");
        assert!(matches!(err, Error::NotLinked(_)));
    }

    #[test]
    fn links_stay_injective_both_ways() {
        let dir = TempDir::new().unwrap();
        let store = store_with_issues(&dir, &["CCPRISM-1", "CCPRISM-2", "CCPRISM-3"]);

        link(&store, "CCPRISM-1", "a.md").expect("link");
        link(&store, "CCPRISM-2", "b.md").expect("link");
        let _ = link(&store, "CCPRISM-3", "a.md");
        let _ = link(&store, "CCPRISM-1", "c.md");

        let doc = store.load().expect("load");
        let keys: std::collections::HashSet<_> = doc.linked.keys().collect();
        let values: std::collections::HashSet<_> = doc.linked.values().collect();
        assert_eq!(keys.len(), doc.linked.len());
        assert_eq!(values.len(), doc.linked.len());
    }
}
