//! Read-only projections over the cache document
//!
//! Nothing here mutates the store; every function is one lock-free load
//! followed by a projection. All of them require an existing cache file.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStore, IssueRecord};
use crate::error::{Error, Result};

/// Condensed issue projection used by listings
#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub name: String,
    pub state: Option<String>,
}

impl From<&IssueRecord> for IssueSummary {
    fn from(record: &IssueRecord) -> Self {
        Self {
            name: record.name.clone(),
            state: record.state.clone(),
        }
    }
}

/// Top-level cache summary
#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    pub project: String,
    pub project_name: String,
    pub project_id: Option<String>,
    pub workspace: Option<String>,
    pub issues_count: usize,
    pub linked_count: usize,
    pub states_count: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueListing {
    pub issues: BTreeMap<String, IssueSummary>,
    pub count: usize,
}

/// Full single-issue view, including its linked task if any
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetails {
    pub issue: String,
    #[serde(flatten)]
    pub record: IssueRecord,
    pub linked_task: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedIssue {
    pub task: String,
    pub name: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedListing {
    pub linked: BTreeMap<String, LinkedIssue>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnlinkedListing {
    pub unlinked: BTreeMap<String, IssueSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateListing {
    pub states: BTreeMap<String, String>,
}

pub fn summary(store: &CacheStore) -> Result<CacheSummary> {
    let doc = store.load_required()?;
    Ok(CacheSummary {
        project: doc
            .project
            .identifier
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        project_name: doc
            .project
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        project_id: doc.project.id.clone(),
        workspace: doc.project.workspace.clone(),
        issues_count: doc.issues.len(),
        linked_count: doc.linked.len(),
        states_count: doc.states.len(),
        last_sync: doc.last_sync,
    })
}

/// List issues, optionally filtered by exact state name (case-insensitive)
pub fn issues(store: &CacheStore, state_filter: Option<&str>) -> Result<IssueListing> {
    let doc = store.load_required()?;
    let issues: BTreeMap<String, IssueSummary> = doc
        .issues
        .iter()
        .filter(|(_, record)| match state_filter {
            Some(filter) => record
                .state
                .as_deref()
                .is_some_and(|state| state.eq_ignore_ascii_case(filter)),
            None => true,
        })
        .map(|(key, record)| (key.clone(), IssueSummary::from(record)))
        .collect();

    let count = issues.len();
    Ok(IssueListing { issues, count })
}

/// Look up one issue by key
pub fn issue(store: &CacheStore, key: &str) -> Result<IssueDetails> {
    let doc = store.load_required()?;
    let record = doc
        .issues
        .get(key)
        .cloned()
        .ok_or_else(|| Error::IssueNotFound(key.to_string()))?;

    Ok(IssueDetails {
        issue: key.to_string(),
        linked_task: doc.linked.get(key).cloned(),
        record,
    })
}

/// Join of links and issue records
pub fn linked(store: &CacheStore) -> Result<LinkedListing> {
    let doc = store.load_required()?;
    let linked: BTreeMap<String, LinkedIssue> = doc
        .linked
        .iter()
        .map(|(issue_key, task_file)| {
            let record = doc.issues.get(issue_key);
            (
                issue_key.clone(),
                LinkedIssue {
                    task: task_file.clone(),
                    name: record.map(|record| record.name.clone()),
                    state: record.and_then(|record| record.state.clone()),
                },
            )
        })
        .collect();

    let count = linked.len();
    Ok(LinkedListing { linked, count })
}

/// Issues with no link
pub fn unlinked(store: &CacheStore) -> Result<UnlinkedListing> {
    let doc = store.load_required()?;
    let unlinked: BTreeMap<String, IssueSummary> = doc
        .issues
        .iter()
        .filter(|(key, _)| !doc.linked.contains_key(*key))
        .map(|(key, record)| (key.clone(), IssueSummary::from(record)))
        .collect();

    let count = unlinked.len();
    Ok(UnlinkedListing { unlinked, count })
}

/// Raw canonical-status-to-state-id map
pub fn states(store: &CacheStore) -> Result<StateListing> {
    let doc = store.load_required()?;
    Ok(StateListing { states: doc.states })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> CacheStore {
        let store = CacheStore::with_defaults(dir.path().join("plane-sync.json"));
        store
            .update(|doc| {
                doc.project.identifier = Some("CCPRISM".to_string());
                doc.project.name = Some("Prism".to_string());
                doc.states
                    .insert("pending".to_string(), "s1".to_string());
                doc.issues.insert(
                    "CCPRISM-1".to_string(),
                    IssueRecord {
                        id: "u1".to_string(),
                        name: "First".to_string(),
                        state: Some("Todo".to_string()),
                        state_id: Some("s1".to_string()),
                        priority: "none".to_string(),
                        updated_at: None,
                    },
                );
                doc.issues.insert(
                    "CCPRISM-2".to_string(),
                    IssueRecord {
                        id: "u2".to_string(),
                        name: "Second".to_string(),
                        state: Some("In Progress".to_string()),
                        ..IssueRecord::default()
                    },
                );
                doc.linked
                    .insert("CCPRISM-2".to_string(), "b.md".to_string());
                Ok(())
            })
            .expect("seed");
        store
    }

    #[test]
    fn summary_counts_everything() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let summary = summary(&store).expect("summary");
        assert_eq!(summary.project, "CCPRISM");
        assert_eq!(summary.issues_count, 2);
        assert_eq!(summary.linked_count, 1);
        assert_eq!(summary.states_count, 1);
    }

    #[test]
    fn queries_require_an_existing_cache() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::with_defaults(dir.path().join("missing.json"));

        assert!(matches!(
            summary(&store),
            Err(Error::CacheNotFound(_))
        ));
        assert!(matches!(
            issues(&store, None),
            Err(Error::CacheNotFound(_))
        ));
    }

    #[test]
    fn state_filter_is_case_insensitive_exact() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let listing = issues(&store, Some("in progress")).expect("issues");
        assert_eq!(listing.count, 1);
        assert!(listing.issues.contains_key("CCPRISM-2"));

        let listing = issues(&store, Some("progress")).expect("issues");
        assert_eq!(listing.count, 0);
    }

    #[test]
    fn issue_lookup_includes_linked_task() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let details = issue(&store, "CCPRISM-2").expect("issue");
        assert_eq!(details.linked_task.as_deref(), Some("b.md"));
        assert_eq!(details.record.name, "Second");

        let details = issue(&store, "CCPRISM-1").expect("issue");
        assert!(details.linked_task.is_none());

        let err = issue(&store, "CCPRISM-9").expect_err("missing issue");
        assert!(matches!(err, Error::IssueNotFound(_)));
    }

    #[test]
    fn linked_and_unlinked_partition_issues() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let linked = linked(&store).expect("linked");
        assert_eq!(linked.count, 1);
        assert_eq!(
            linked.linked.get("CCPRISM-2").map(|entry| entry.task.as_str()),
            Some("b.md")
        );

        let unlinked = unlinked(&store).expect("unlinked");
        assert_eq!(unlinked.count, 1);
        assert!(unlinked.unlinked.contains_key("CCPRISM-1"));
    }

    #[test]
    fn states_returns_raw_map() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let listing = states(&store).expect("states");
        assert_eq!(listing.states.get("pending").map(String::as_str), Some("s1"));
    }
}
