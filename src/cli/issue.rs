//! plsync issue command implementation

use std::path::PathBuf;

use crate::error::Result;
use crate::links::{self, IssueFields, UpsertAction};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for `plsync issue add`
pub struct AddOptions {
    pub key: String,
    pub data: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub state_id: Option<String>,
    pub priority: Option<String>,
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache);

    let fields = match options.data {
        Some(data) => IssueFields::from_json_str(&data)?,
        None => IssueFields {
            id: options.id,
            name: options.name,
            state: options.state,
            state_id: options.state_id,
            priority: options.priority,
            updated_at: None,
        },
    };

    let outcome = links::upsert_issue(&store, &options.key, fields)?;

    let action = match outcome.action {
        UpsertAction::Added => "added",
        UpsertAction::Updated => "updated",
    };
    let mut human = HumanOutput::new(format!("plsync issue add: {} {action}", outcome.issue));
    human.push_summary("issue", outcome.issue.clone());
    human.push_summary("name", outcome.name.clone());
    human.push_next_step(format!("plsync link {} <task-file>", outcome.issue));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "issue add",
        &outcome,
        Some(&human),
    )?;

    Ok(())
}
