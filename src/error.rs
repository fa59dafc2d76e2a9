//! Error types for plsync
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown issue, malformed snapshot)
//! - 3: Blocked by policy (link bijection conflict)
//! - 4: Operation failed (IO, corrupt cache, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the plsync CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for plsync operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Issue {0} not found in cache. Run plsync sync first.")]
    IssueNotFound(String),

    #[error("Issue {0} is not linked to any task.")]
    NotLinked(String),

    #[error("Cache not found at {0}. Run plsync sync first.")]
    CacheNotFound(PathBuf),

    #[error("Invalid snapshot: {0}")]
    SnapshotValidation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Policy blocks (exit code 3)
    #[error("Issue {issue} already linked to {task}. Unlink first.")]
    IssueAlreadyLinked { issue: String, task: String },

    #[error("Task {task} already linked to {issue}.")]
    TaskAlreadyLinked { task: String, issue: String },

    // Operation failures (exit code 4)
    #[error("Corrupt cache at {path}: {reason}")]
    CorruptCache { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Validation(_)
            | Error::IssueNotFound(_)
            | Error::NotLinked(_)
            | Error::CacheNotFound(_)
            | Error::SnapshotValidation(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Policy blocks
            Error::IssueAlreadyLinked { .. } | Error::TaskAlreadyLinked { .. } => {
                exit_codes::POLICY_BLOCKED
            }

            // Operation failures
            Error::CorruptCache { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for plsync operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        assert_eq!(
            Error::Validation("missing id".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::IssueNotFound("CCPRISM-1".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::SnapshotValidation("issue 3 missing name".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::IssueAlreadyLinked {
                issue: "CCPRISM-1".into(),
                task: "a.md".into(),
            }
            .exit_code(),
            exit_codes::POLICY_BLOCKED
        );
        assert_eq!(
            Error::CorruptCache {
                path: PathBuf::from("cache.json"),
                reason: "not JSON".into(),
            }
            .exit_code(),
            exit_codes::OPERATION_FAILED
        );
        assert_eq!(
            Error::LockFailed(PathBuf::from("cache.json.lock")).exit_code(),
            exit_codes::OPERATION_FAILED
        );
    }

    #[test]
    fn messages_name_the_offender() {
        let err = Error::IssueAlreadyLinked {
            issue: "CCPRISM-27".into(),
            task: "m-feature.md".into(),
        };
        let text = err.to_string();
        assert!(text.contains("CCPRISM-27"));
        assert!(text.contains("m-feature.md"));
    }
}
