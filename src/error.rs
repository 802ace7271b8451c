//! Error taxonomy for lifecycle store operations
//!
//! Every failure is surfaced as a distinct, typed condition; nothing is
//! swallowed into a default value. The CLI and MCP layers absorb these
//! into `anyhow` at the boundary.

use std::path::PathBuf;

/// Result type for lifecycle store operations
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Errors that can occur when working with project lifecycle state
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    #[error("version '{version}' not found in project '{project}'")]
    VersionNotFound { project: String, version: String },

    #[error("stage '{stage}' not found in version '{version}'")]
    StageNotFound { version: String, stage: String },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("path '{path}' escapes the project directory")]
    SecurityViolation { path: String },

    #[error("status document for project '{project}' is corrupt: {source}")]
    CorruptDocument {
        project: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("concurrent update on project '{project}': expected revision {expected}, found {found}")]
    Conflict {
        project: String,
        expected: u64,
        found: u64,
    },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LifecycleError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LifecycleError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a validation error from a message
    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    /// True for the NotFound family (project, version, stage, or file)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LifecycleError::ProjectNotFound(_)
                | LifecycleError::VersionNotFound { .. }
                | LifecycleError::StageNotFound { .. }
                | LifecycleError::FileNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(LifecycleError::ProjectNotFound("x".to_string()).is_not_found());
        assert!(LifecycleError::FileNotFound("a/b.md".to_string()).is_not_found());
        assert!(!LifecycleError::validation("bad").is_not_found());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = LifecycleError::VersionNotFound {
            project: "my-agent".to_string(),
            version: "v20260101000000".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("my-agent"));
        assert!(msg.contains("v20260101000000"));

        let err = LifecycleError::Conflict {
            project: "my-agent".to_string(),
            expected: 3,
            found: 4,
        };
        assert!(err.to_string().contains("expected revision 3"));
    }
}
