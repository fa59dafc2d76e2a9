//! Command-line interface for plsync
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;

mod discover;
mod issue;
mod link;
mod show;
mod sync;

/// plsync - Plane sync cache
///
/// A CLI that mirrors remote Plane issues into a local cache and keeps a
/// strict one-to-one link between issues and local task files.
#[derive(Parser, Debug)]
#[command(name = "plsync")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the cache file (defaults to the configured path)
    #[arg(long, global = true, env = "PLSYNC_CACHE")]
    pub cache: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge a fetched remote snapshot into the cache
    Sync {
        /// Snapshot JSON (read from stdin when omitted)
        #[arg(long)]
        data: Option<String>,

        /// Only refresh the lastSync timestamp
        #[arg(long)]
        touch: bool,
    },

    /// Manual issue management
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Link an issue to a task file
    Link {
        /// Issue key (e.g., CCPRISM-27)
        issue: String,

        /// Task file name (e.g., m-implement-feature.md)
        task: String,
    },

    /// Remove an issue's link
    Unlink {
        /// Issue key (e.g., CCPRISM-27)
        issue: String,
    },

    /// Compare the cache with local task files
    Discover {
        /// Tasks directory (defaults to the configured directory)
        #[arg(long)]
        tasks_dir: Option<PathBuf>,

        /// Also check for status mismatches on linked tasks
        #[arg(long)]
        status_check: bool,
    },

    /// Read-only cache views
    #[command(subcommand)]
    Show(ShowCommands),
}

/// Issue subcommands
#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Add or update a single issue
    Add {
        /// Issue key (e.g., CCPRISM-27)
        #[arg(long)]
        key: String,

        /// JSON issue data (overrides the field flags)
        #[arg(long)]
        data: Option<String>,

        /// Remote issue id
        #[arg(long)]
        id: Option<String>,

        /// Issue name/title
        #[arg(long)]
        name: Option<String>,

        /// State name (e.g., "In Progress")
        #[arg(long)]
        state: Option<String>,

        /// Remote state id
        #[arg(long)]
        state_id: Option<String>,

        /// Priority level
        #[arg(long)]
        priority: Option<String>,
    },
}

/// Show subcommands
#[derive(Subcommand, Debug)]
pub enum ShowCommands {
    /// Project and count summary (default)
    Summary,

    /// List issues
    Issues {
        /// Filter by exact state name (case-insensitive)
        #[arg(long)]
        state: Option<String>,
    },

    /// Show one issue
    Issue {
        /// Issue key (e.g., CCPRISM-27)
        key: String,
    },

    /// List linked issues
    Linked,

    /// List issues with no link
    Unlinked,

    /// Show the state mapping
    States,
}

/// Resolve the cache store from the flag, env, or config file
pub(crate) fn open_store(cache: Option<PathBuf>) -> (CacheStore, Config) {
    let config = Config::load_from_dir(Path::new("."));
    let path = cache.unwrap_or_else(|| config.cache.path.clone());
    let store = CacheStore::new(path, config.cache.lock_timeout_ms);
    (store, config)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Sync { data, touch } => sync::run(sync::SyncOptions {
                data,
                touch,
                cache: self.cache,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Issue(cmd) => match cmd {
                IssueCommands::Add {
                    key,
                    data,
                    id,
                    name,
                    state,
                    state_id,
                    priority,
                } => issue::run_add(issue::AddOptions {
                    key,
                    data,
                    id,
                    name,
                    state,
                    state_id,
                    priority,
                    cache: self.cache,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Link { issue, task } => link::run_link(link::LinkOptions {
                issue,
                task,
                cache: self.cache,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Unlink { issue } => link::run_unlink(link::UnlinkOptions {
                issue,
                cache: self.cache,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Discover {
                tasks_dir,
                status_check,
            } => discover::run(discover::DiscoverOptions {
                tasks_dir,
                status_check,
                cache: self.cache,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show(cmd) => {
                let options = show::ShowOptions {
                    cache: self.cache,
                    json: self.json,
                    quiet: self.quiet,
                };
                match cmd {
                    ShowCommands::Summary => show::run_summary(options),
                    ShowCommands::Issues { state } => show::run_issues(options, state),
                    ShowCommands::Issue { key } => show::run_issue(options, &key),
                    ShowCommands::Linked => show::run_linked(options),
                    ShowCommands::Unlinked => show::run_unlinked(options),
                    ShowCommands::States => show::run_states(options),
                }
            }
        }
    }
}
