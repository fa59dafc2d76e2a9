//! Remote snapshot input types
//!
//! A snapshot is the already-fetched remote payload handed to `sync`:
//! optional project descriptor, optional state list, optional issue list.
//! Fetching is the caller's problem; this module only decodes and validates.
//!
//! Remote payloads are loosely shaped: `state` and `priority` arrive either
//! as an object carrying an id or as a bare scalar, and either may be absent.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Project descriptor as sent by the remote tracker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotProject {
    pub id: Option<String>,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub workspace: Option<String>,
}

/// Remote workflow state: id, display name, and state group
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteState {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group: String,
}

/// Reference that is either `{"id": "..."}` or a bare scalar id
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Object { id: Option<String> },
    Scalar(String),
}

impl IdRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            IdRef::Object { id } => id.as_deref(),
            IdRef::Scalar(value) => Some(value.as_str()),
        }
    }
}

/// Remote issue entry
///
/// Required fields are decoded as options so a malformed entry surfaces as a
/// `SnapshotValidation` error naming the entry, not as a decode failure for
/// the whole payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIssue {
    pub id: Option<String>,
    pub sequence_id: Option<u64>,
    pub name: Option<String>,
    pub state: Option<IdRef>,
    pub priority: Option<IdRef>,
    pub updated_at: Option<String>,
}

/// A validated view over one issue entry
#[derive(Debug, Clone, Copy)]
pub struct CheckedIssue<'a> {
    pub id: &'a str,
    pub sequence: u64,
    pub name: &'a str,
    pub state_id: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

/// The full snapshot payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    pub project: Option<SnapshotProject>,
    pub states: Option<Vec<RemoteState>>,
    pub issues: Option<Vec<RemoteIssue>>,
}

impl Snapshot {
    /// Decode a snapshot from JSON text
    ///
    /// Shape errors are reported as `SnapshotValidation`, not as generic
    /// JSON errors, so callers see one taxonomy for bad remote payloads.
    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|err| Error::SnapshotValidation(err.to_string()))
    }

    /// Validate every issue entry and return checked views
    ///
    /// One bad entry fails the whole snapshot; nothing is partially
    /// accepted. Entries need a non-empty id, a non-empty name, and a
    /// sequence number.
    pub fn checked_issues(&self) -> Result<Vec<CheckedIssue<'_>>> {
        let issues = match &self.issues {
            Some(issues) => issues,
            None => return Ok(Vec::new()),
        };

        let mut checked = Vec::with_capacity(issues.len());
        for (index, issue) in issues.iter().enumerate() {
            let id = non_empty(issue.id.as_deref())
                .ok_or_else(|| entry_error(index, "missing id"))?;
            let name = non_empty(issue.name.as_deref())
                .ok_or_else(|| entry_error(index, "missing name"))?;
            let sequence = issue
                .sequence_id
                .ok_or_else(|| entry_error(index, "missing sequence_id"))?;

            checked.push(CheckedIssue {
                id,
                sequence,
                name,
                state_id: issue.state.as_ref().and_then(IdRef::id),
                priority: issue.priority.as_ref().and_then(IdRef::id),
                updated_at: issue.updated_at.as_deref(),
            });
        }
        Ok(checked)
    }

    /// Validate without keeping the checked views
    pub fn validate(&self) -> Result<()> {
        self.checked_issues().map(|_| ())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn entry_error(index: usize, reason: &str) -> Error {
    Error::SnapshotValidation(format!("issues[{index}]: {reason}"))
}
