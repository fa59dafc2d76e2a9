//! Snapshot reconciliation
//!
//! Merges a remote snapshot into the cache document: project overwrite,
//! state-vocabulary normalization, and idempotent issue upsert with
//! new/updated delta detection. Deltas are timestamp-based only: an issue
//! whose fields changed under an identical `updated_at` is not reported.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheStore, IssueRecord, ProjectRecord};
use crate::error::Result;
use crate::snapshot::{RemoteState, Snapshot};

/// Display name used when an issue's state cannot be resolved
pub const UNKNOWN_STATE_NAME: &str = "Unknown";

/// Issue-key prefix used before a project identifier is known
const PLACEHOLDER_IDENTIFIER: &str = "PROJ";

/// Normalized state names that always keep their own mapping slot, so
/// same-group states like "In Progress" and "In Review" stay addressable
const LITERAL_STATE_NAMES: [&str; 2] = ["in_review", "ready_to_merge"];

/// Summary of one sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub issues_count: usize,
    pub states_count: usize,
    pub new: Vec<String>,
    pub updated: Vec<String>,
}

/// Summary of a timestamp-only heartbeat
#[derive(Debug, Clone, Serialize)]
pub struct TouchOutcome {
    pub issues_count: usize,
    pub touched: bool,
}

/// Map a remote state group to the canonical status vocabulary
///
/// Unknown groups pass through unchanged.
pub fn canonical_status(group: &str) -> &str {
    match group {
        "backlog" => "backlog",
        "unstarted" => "pending",
        "started" => "in_progress",
        "completed" => "completed",
        "cancelled" => "cancelled",
        other => other,
    }
}

fn normalized_state_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

fn resolve_state_name(state_id: Option<&str>, states_by_id: &HashMap<&str, &RemoteState>) -> String {
    state_id
        .and_then(|id| states_by_id.get(id))
        .map(|state| state.name.clone())
        .unwrap_or_else(|| UNKNOWN_STATE_NAME.to_string())
}

/// Merge a snapshot into the cache and report the delta
///
/// The snapshot is validated before the cache is touched: one malformed
/// issue entry aborts the whole batch and leaves the document unchanged.
/// Always refreshes `lastSync`, even for an empty snapshot.
pub fn sync(store: &CacheStore, snapshot: &Snapshot) -> Result<SyncOutcome> {
    let issues = snapshot.checked_issues()?;

    store.update(|doc| {
        let mut new_keys = Vec::new();
        let mut updated_keys = Vec::new();

        if let Some(project) = &snapshot.project {
            // A descriptor without a workspace keeps the cached one
            let workspace = project
                .workspace
                .clone()
                .or_else(|| doc.project.workspace.take());
            doc.project = ProjectRecord {
                id: project.id.clone(),
                identifier: project.identifier.clone(),
                name: project.name.clone(),
                workspace,
            };
        }

        let mut states_by_id: HashMap<&str, &RemoteState> = HashMap::new();
        if let Some(states) = &snapshot.states {
            for state in states {
                states_by_id.insert(state.id.as_str(), state);

                let normalized = normalized_state_name(&state.name);
                if LITERAL_STATE_NAMES.contains(&normalized.as_str()) {
                    doc.states.insert(normalized, state.id.clone());
                } else {
                    // First-seen-wins: a later same-group state never
                    // displaces the canonical slot
                    let status_key = canonical_status(&state.group).to_string();
                    doc.states
                        .entry(status_key)
                        .or_insert_with(|| state.id.clone());
                }
            }
        }

        if !issues.is_empty() {
            let identifier = doc
                .project
                .identifier
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IDENTIFIER.to_string());

            for issue in &issues {
                let key = format!("{identifier}-{}", issue.sequence);
                let record = IssueRecord {
                    id: issue.id.to_string(),
                    name: issue.name.to_string(),
                    state: Some(resolve_state_name(issue.state_id, &states_by_id)),
                    state_id: issue.state_id.map(str::to_string),
                    priority: issue.priority.unwrap_or("none").to_string(),
                    updated_at: issue.updated_at.map(str::to_string),
                };

                match doc.issues.get(&key) {
                    None => new_keys.push(key.clone()),
                    Some(existing) if existing.updated_at.as_deref() != issue.updated_at => {
                        updated_keys.push(key.clone());
                    }
                    Some(_) => {}
                }

                // Upsert unconditionally; unchanged records are overwritten
                doc.issues.insert(key, record);
            }
        }

        doc.last_sync = Some(Utc::now());

        debug!(
            new = new_keys.len(),
            updated = updated_keys.len(),
            issues = doc.issues.len(),
            "snapshot applied"
        );

        Ok(SyncOutcome {
            issues_count: doc.issues.len(),
            states_count: doc.states.len(),
            new: new_keys,
            updated: updated_keys,
        })
    })
}

/// Refresh only `lastSync`, as a heartbeat without a data payload
pub fn touch(store: &CacheStore) -> Result<TouchOutcome> {
    store.update(|doc| {
        doc.last_sync = Some(Utc::now());
        Ok(TouchOutcome {
            issues_count: doc.issues.len(),
            touched: true,
        })
    })
}
