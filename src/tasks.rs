//! Task file collaborator
//!
//! Discovery needs an enumeration of local task files, each exposing an
//! optional string-to-string frontmatter mapping. The `TaskSource` trait is
//! that capability; the discovery core depends only on it, never on how the
//! frontmatter was scanned. `DirTaskSource` is the concrete implementation
//! the CLI wires in: markdown files in one directory, frontmatter between
//! leading `---` markers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};

/// Parsed frontmatter key/value pairs
pub type Frontmatter = BTreeMap<String, String>;

/// One enumerated task file
#[derive(Debug, Clone, Serialize)]
pub struct TaskFile {
    pub file: String,
    pub frontmatter: Option<Frontmatter>,
}

/// Capability to enumerate task files with parsed frontmatter
pub trait TaskSource {
    fn task_files(&self) -> Result<Vec<TaskFile>>;
}

/// Parse `---`-delimited frontmatter into a key/value mapping
///
/// Returns `None` when the content does not start with a frontmatter block.
/// Values keep inner colons; keys and values are trimmed.
pub fn parse_frontmatter(content: &str) -> Option<Frontmatter> {
    let body = content.strip_prefix("---\n")?;
    let end = body.find("\n---")?;

    let mut frontmatter = Frontmatter::new();
    for line in body[..end].lines() {
        if let Some((key, value)) = line.split_once(':') {
            frontmatter.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Some(frontmatter)
}

/// Directory-backed task source over `<dir>/*.md`
#[derive(Debug, Clone)]
pub struct DirTaskSource {
    dir: PathBuf,
}

impl DirTaskSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl TaskSource for DirTaskSource {
    /// Enumerate task files; a missing directory is an empty listing
    fn task_files(&self) -> Result<Vec<TaskFile>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let pattern = self.dir.join("*.md");
        let pattern = pattern
            .to_str()
            .ok_or_else(|| Error::InvalidArgument("tasks dir is not valid UTF-8".to_string()))?;

        let mut files = Vec::new();
        for entry in glob::glob(pattern)
            .map_err(|err| Error::InvalidArgument(format!("bad tasks pattern: {err}")))?
        {
            let path = match entry {
                Ok(path) => path,
                Err(_) => continue,
            };
            let Some(file) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            // Unreadable files are listed with no frontmatter rather than
            // failing the whole enumeration
            let frontmatter = std::fs::read_to_string(&path)
                .ok()
                .as_deref()
                .and_then(parse_frontmatter);

            files.push(TaskFile {
                file: file.to_string(),
                frontmatter,
            });
        }

        files.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(files)
    }
}
