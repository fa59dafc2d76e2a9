//! plsync sync command implementation
//!
//! Feeds an already-fetched remote snapshot into the reconciler, or runs a
//! timestamp-only heartbeat with `--touch`.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::reconcile;
use crate::snapshot::Snapshot;

/// Options for `plsync sync`
pub struct SyncOptions {
    pub data: Option<String>,
    pub touch: bool,
    pub cache: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: SyncOptions) -> Result<()> {
    let (store, _config) = super::open_store(options.cache);
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    if options.touch {
        let outcome = reconcile::touch(&store)?;

        let mut human = HumanOutput::new("plsync sync: timestamp refreshed");
        human.push_summary("issues", outcome.issues_count.to_string());

        emit_success(output, "sync", &outcome, Some(&human))?;
        return Ok(());
    }

    let data = match options.data {
        Some(data) => data,
        None => read_stdin()?,
    };
    let snapshot = Snapshot::from_json_str(&data)?;
    let outcome = reconcile::sync(&store, &snapshot)?;

    let mut human = HumanOutput::new(format!(
        "plsync sync: {} issues, {} states",
        outcome.issues_count, outcome.states_count
    ));
    human.push_summary("new", outcome.new.len().to_string());
    human.push_summary("updated", outcome.updated.len().to_string());
    for key in &outcome.new {
        human.push_detail(format!("new: {key}"));
    }
    for key in &outcome.updated {
        human.push_detail(format!("updated: {key}"));
    }
    if !outcome.new.is_empty() {
        human.push_next_step("plsync discover");
    }

    emit_success(output, "sync", &outcome, Some(&human))?;

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(Error::InvalidArgument(
            "no snapshot provided; use --data, --touch, or pipe JSON to stdin".to_string(),
        ));
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer)
}
