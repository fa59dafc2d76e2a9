//! plsync link/unlink command implementations

use std::path::PathBuf;

use crate::error::Result;
use crate::links;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for `plsync link`
pub struct LinkOptions {
    pub issue: String,
    pub task: String,
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Options for `plsync unlink`
pub struct UnlinkOptions {
    pub issue: String,
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_link(options: LinkOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache);

    let outcome = links::link(&store, &options.issue, &options.task)?;

    let header = if outcome.already_linked {
        format!("plsync link: {} already linked to {}", outcome.issue, outcome.task)
    } else {
        format!("plsync link: {} linked to {}", outcome.issue, outcome.task)
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("issue", outcome.issue.clone());
    human.push_summary("task", outcome.task.clone());
    human.push_summary("name", outcome.issue_name.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "link",
        &outcome,
        Some(&human),
    )?;

    Ok(())
}

pub fn run_unlink(options: UnlinkOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache);

    let outcome = links::unlink(&store, &options.issue)?;

    let mut human = HumanOutput::new(format!("plsync unlink: {}", outcome.issue));
    human.push_summary("was linked to", outcome.was_linked_to.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "unlink",
        &outcome,
        Some(&human),
    )?;

    Ok(())
}
