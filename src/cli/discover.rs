//! plsync discover command implementation

use std::path::PathBuf;

use crate::discover;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::tasks::DirTaskSource;

/// Options for `plsync discover`
pub struct DiscoverOptions {
    pub tasks_dir: Option<PathBuf>,
    pub status_check: bool,
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: DiscoverOptions) -> Result<()> {
    let (store, config) = super::open_store(options.cache);
    let tasks_dir = options.tasks_dir.unwrap_or(config.tasks.dir);
    let source = DirTaskSource::new(tasks_dir);

    let report = discover::discover(&store, &source, options.status_check)?;

    let mut human = HumanOutput::new(format!(
        "plsync discover: {} unlinked issues, {} unlinked tasks",
        report.summary.unlinked_issues, report.summary.unlinked_tasks
    ));
    human.push_summary("issues", report.summary.total_issues.to_string());
    human.push_summary("linked", report.summary.total_linked.to_string());
    if options.status_check {
        human.push_summary("mismatches", report.summary.mismatches.to_string());
    }

    for (key, issue) in &report.unlinked_issues {
        human.push_detail(format!(
            "issue {key}: {} ({})",
            issue.name,
            issue.state.as_deref().unwrap_or("?")
        ));
    }
    for task in &report.unlinked_tasks {
        match &task.claims_issue {
            Some(claim) => human.push_detail(format!("task {}: claims {claim}", task.file)),
            None => human.push_detail(format!("task {}", task.file)),
        }
    }
    for mismatch in &report.status_mismatches {
        human.push_warning(format!(
            "{} is '{}' locally but '{}' remotely (expected '{}')",
            mismatch.issue, mismatch.task_status, mismatch.plane_state, mismatch.expected_state
        ));
    }
    if report.summary.unlinked_issues > 0 {
        human.push_next_step("plsync link <issue-key> <task-file>");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "discover",
        &report,
        Some(&human),
    )?;

    Ok(())
}
