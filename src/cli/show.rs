//! plsync show command implementations
//!
//! Read-only cache views; nothing here takes the cache lock.

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query;

/// Shared options for `plsync show` subcommands
pub struct ShowOptions {
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl ShowOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub fn run_summary(options: ShowOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let summary = query::summary(&store)?;

    let mut human = HumanOutput::new(format!("plsync: {} ({})", summary.project, summary.project_name));
    human.push_summary("issues", summary.issues_count.to_string());
    human.push_summary("linked", summary.linked_count.to_string());
    human.push_summary("states", summary.states_count.to_string());
    human.push_summary(
        "last sync",
        summary
            .last_sync
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_else(|| "never".to_string()),
    );

    emit_success(options.output(), "show summary", &summary, Some(&human))?;
    Ok(())
}

pub fn run_issues(options: ShowOptions, state: Option<String>) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let listing = query::issues(&store, state.as_deref())?;

    let mut human = HumanOutput::new(format!("plsync issues: {}", listing.count));
    for (key, issue) in &listing.issues {
        human.push_detail(format!(
            "{key}: {} ({})",
            issue.name,
            issue.state.as_deref().unwrap_or("?")
        ));
    }

    emit_success(options.output(), "show issues", &listing, Some(&human))?;
    Ok(())
}

pub fn run_issue(options: ShowOptions, key: &str) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let details = query::issue(&store, key)?;

    let mut human = HumanOutput::new(format!("{}: {}", details.issue, details.record.name));
    human.push_summary(
        "state",
        details.record.state.clone().unwrap_or_else(|| "?".to_string()),
    );
    human.push_summary("priority", details.record.priority.clone());
    match &details.linked_task {
        Some(task) => human.push_summary("linked task", task.clone()),
        None => human.push_warning("not linked to any task".to_string()),
    }

    emit_success(options.output(), "show issue", &details, Some(&human))?;
    Ok(())
}

pub fn run_linked(options: ShowOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let listing = query::linked(&store)?;

    let mut human = HumanOutput::new(format!("plsync linked: {}", listing.count));
    for (key, entry) in &listing.linked {
        human.push_detail(format!("{key} -> {}", entry.task));
    }

    emit_success(options.output(), "show linked", &listing, Some(&human))?;
    Ok(())
}

pub fn run_unlinked(options: ShowOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let listing = query::unlinked(&store)?;

    let mut human = HumanOutput::new(format!("plsync unlinked: {}", listing.count));
    for (key, issue) in &listing.unlinked {
        human.push_detail(format!(
            "{key}: {} ({})",
            issue.name,
            issue.state.as_deref().unwrap_or("?")
        ));
    }
    if listing.count > 0 {
        human.push_next_step("plsync link <issue-key> <task-file>");
    }

    emit_success(options.output(), "show unlinked", &listing, Some(&human))?;
    Ok(())
}

pub fn run_states(options: ShowOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache.clone());
    let listing = query::states(&store)?;

    let mut human = HumanOutput::new(format!("plsync states: {}", listing.states.len()));
    for (status, id) in &listing.states {
        human.push_detail(format!("{status} -> {id}"));
    }

    emit_success(options.output(), "show states", &listing, Some(&human))?;
    Ok(())
}
