//! Gap discovery between the cache and local task files
//!
//! Diffs the cache against a task-file collaborator to surface issues with
//! no task, tasks with no issue (including stale frontmatter claims), and
//! optionally status drift between a task's frontmatter and the cached
//! remote state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::query::IssueSummary;
use crate::tasks::{Frontmatter, TaskSource};

/// A task file with no link back to an issue
#[derive(Debug, Clone, Serialize)]
pub struct UnlinkedTask {
    pub file: String,
    /// Frontmatter claimed an issue that is not a current link key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One status drift between a linked task and its cached issue
#[derive(Debug, Clone, Serialize)]
pub struct StatusMismatch {
    pub issue: String,
    pub task: String,
    pub task_status: String,
    pub plane_state: String,
    pub expected_state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverySummary {
    pub unlinked_issues: usize,
    pub unlinked_tasks: usize,
    pub mismatches: usize,
    pub total_issues: usize,
    pub total_linked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub unlinked_issues: BTreeMap<String, IssueSummary>,
    pub unlinked_tasks: Vec<UnlinkedTask>,
    pub status_mismatches: Vec<StatusMismatch>,
    pub summary: DiscoverySummary,
}

/// Map a task status to the remote state name it should correspond to
///
/// Unmapped values pass through unchanged.
pub fn expected_state_for_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "backlog" => "Backlog".to_string(),
        "pending" => "Todo".to_string(),
        "in_progress" | "in-progress" => "In Progress".to_string(),
        "completed" => "Done".to_string(),
        "cancelled" => "Cancelled".to_string(),
        _ => status.to_string(),
    }
}

/// Diff the cache against the task-file collaborator
///
/// Requires an existing cache. Status checking is opt-in; linked files that
/// are missing from the listing or carry no parsable frontmatter are
/// skipped silently.
pub fn discover(
    store: &CacheStore,
    source: &dyn TaskSource,
    check_status: bool,
) -> Result<DiscoveryReport> {
    let doc = store.load_required()?;
    let task_files = source.task_files()?;

    let unlinked_issues: BTreeMap<String, IssueSummary> = doc
        .issues
        .iter()
        .filter(|(key, _)| !doc.linked.contains_key(*key))
        .map(|(key, record)| (key.clone(), IssueSummary::from(record)))
        .collect();

    let mut unlinked_tasks = Vec::new();
    let mut frontmatter_by_file: BTreeMap<&str, &Frontmatter> = BTreeMap::new();

    for task in &task_files {
        if let Some(frontmatter) = &task.frontmatter {
            frontmatter_by_file.insert(task.file.as_str(), frontmatter);
        }

        if doc.linked_tasks().any(|linked| linked == task.file) {
            continue;
        }

        let status = task
            .frontmatter
            .as_ref()
            .and_then(|frontmatter| frontmatter.get("status").cloned());
        let claim = task
            .frontmatter
            .as_ref()
            .and_then(|frontmatter| frontmatter.get("plane_issue"))
            .filter(|claim| !claim.is_empty());

        match claim {
            // The file claims an issue the cache does not link: dangling
            Some(claim) if !doc.linked.contains_key(claim) => {
                unlinked_tasks.push(UnlinkedTask {
                    file: task.file.clone(),
                    claims_issue: Some(claim.clone()),
                    status,
                });
            }
            // Claimed issue is linked (to some file): not this file's gap
            Some(_) => {}
            None => {
                unlinked_tasks.push(UnlinkedTask {
                    file: task.file.clone(),
                    claims_issue: None,
                    status,
                });
            }
        }
    }

    let mut status_mismatches = Vec::new();
    if check_status {
        for (issue_key, task_file) in &doc.linked {
            let Some(frontmatter) = frontmatter_by_file.get(task_file.as_str()) else {
                continue;
            };

            let task_status = frontmatter
                .get("status")
                .cloned()
                .unwrap_or_default();
            let expected_state = expected_state_for_status(&task_status);
            let plane_state = doc
                .issues
                .get(issue_key)
                .and_then(|record| record.state.clone())
                .unwrap_or_default();

            if !expected_state.eq_ignore_ascii_case(&plane_state) {
                status_mismatches.push(StatusMismatch {
                    issue: issue_key.clone(),
                    task: task_file.clone(),
                    task_status,
                    plane_state,
                    expected_state,
                });
            }
        }
    }

    let summary = DiscoverySummary {
        unlinked_issues: unlinked_issues.len(),
        unlinked_tasks: unlinked_tasks.len(),
        mismatches: status_mismatches.len(),
        total_issues: doc.issues.len(),
        total_linked: doc.linked.len(),
    };

    Ok(DiscoveryReport {
        unlinked_issues,
        unlinked_tasks,
        status_mismatches,
        summary,
    })
}
