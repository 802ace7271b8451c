//! Status document model
//!
//! The durable record for one project: an ordered version history with
//! per-version, per-stage progress. Serialized as `status.yaml` in the
//! project directory and treated as the sole source of truth.

use crate::error::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version status values
///
/// `in_progress` is the only non-terminal state; the three terminal states
/// are set by the finalize operation and guard further mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::InProgress => "in_progress",
            VersionStatus::Completed => "completed",
            VersionStatus::Failed => "failed",
            VersionStatus::Cancelled => "cancelled",
        }
    }

    /// True once a version has been finalized
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VersionStatus::InProgress)
    }

    /// Parse a finalize status token
    ///
    /// Only the three terminal values are accepted here; anything else is a
    /// validation failure naming the allowed set.
    pub fn parse_terminal(token: &str) -> LifecycleResult<Self> {
        match token.trim().to_lowercase().as_str() {
            "completed" => Ok(VersionStatus::Completed),
            "failed" => Ok(VersionStatus::Failed),
            "cancelled" => Ok(VersionStatus::Cancelled),
            other => Err(LifecycleError::validation(format!(
                "invalid final status '{}': must be one of completed, failed, cancelled",
                other
            ))),
        }
    }
}

/// Progress record for one pipeline stage within a version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Canonical stage name
    pub name: String,

    /// Free-form progress token (pending, in_progress, completed, blocked, ...)
    pub status: String,

    /// Path of the stage document, relative to the version directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_path: Option<String>,

    /// Short human-readable summary of the stage outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Files produced by this stage, relative to the version directory
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Checksum of the stage document as written (`sha256:<hex>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    /// Seed record for a stage that has not started yet
    pub fn pending(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            status: "pending".to_string(),
            doc_path: None,
            summary: None,
            artifacts: Vec::new(),
            checksum: None,
            updated_at: now,
        }
    }
}

/// Append-only audit record attached to a version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// One-line title of the change
    pub title: String,

    /// What was done and why
    pub description: String,

    /// Canonical stage this change belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Append timestamp
    pub created_at: DateTime<Utc>,
}

/// One build or update attempt of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Unique identifier within the project (immutable once assigned)
    pub version_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Primary state machine value
    pub status: VersionStatus,

    /// The request text that started this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,

    /// Per-stage progress, seeded from the pipeline vocabulary
    #[serde(default)]
    pub stages: Vec<StageRecord>,

    /// Files produced by this version, relative to its directory
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Closing summary, set by the finalize operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Append-only change log
    #[serde(default)]
    pub change_log: Vec<ChangeLogEntry>,

    /// When the version reached a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    /// Create an in-progress version with one pending record per stage
    pub fn new(
        version_id: impl Into<String>,
        request: impl Into<String>,
        stage_names: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            version_id: version_id.into(),
            created_at: now,
            status: VersionStatus::InProgress,
            request: Some(request.into()),
            stages: stage_names
                .iter()
                .map(|name| StageRecord::pending(name, now))
                .collect(),
            artifacts: Vec::new(),
            summary: None,
            change_log: Vec::new(),
            closed_at: None,
        }
    }

    /// Look up a stage record by canonical name
    pub fn find_stage(&self, stage_name: &str) -> LifecycleResult<&StageRecord> {
        self.stages
            .iter()
            .find(|s| s.name == stage_name)
            .ok_or_else(|| LifecycleError::StageNotFound {
                version: self.version_id.clone(),
                stage: stage_name.to_string(),
            })
    }

    /// Mutable stage lookup by canonical name
    pub fn find_stage_mut(&mut self, stage_name: &str) -> Option<&mut StageRecord> {
        self.stages.iter_mut().find(|s| s.name == stage_name)
    }
}

/// The durable record for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDocument {
    /// Project name (matches the directory name)
    pub project: String,

    /// Optimistic-concurrency token, incremented on every save
    #[serde(default)]
    pub revision: u64,

    /// Identifier of the version most recently initialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,

    /// Last mutation timestamp
    pub last_updated: DateTime<Utc>,

    /// Version history, oldest first
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

impl StatusDocument {
    /// Fresh document for a newly initialized project
    pub fn new(project: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            project: project.into(),
            revision: 0,
            current_version: None,
            last_updated: now,
            versions: Vec::new(),
        }
    }

    /// Look up a version by identifier
    pub fn find_version(&self, version_id: &str) -> LifecycleResult<&VersionRecord> {
        self.versions
            .iter()
            .find(|v| v.version_id == version_id)
            .ok_or_else(|| LifecycleError::VersionNotFound {
                project: self.project.clone(),
                version: version_id.to_string(),
            })
    }

    /// Mutable version lookup by identifier
    pub fn find_version_mut(&mut self, version_id: &str) -> LifecycleResult<&mut VersionRecord> {
        let project = self.project.clone();
        self.versions
            .iter_mut()
            .find(|v| v.version_id == version_id)
            .ok_or_else(|| LifecycleError::VersionNotFound {
                project,
                version: version_id.to_string(),
            })
    }

    /// Identifiers of all versions, for collision-free allocation
    pub fn version_ids(&self) -> std::collections::HashSet<String> {
        self.versions
            .iter()
            .map(|v| v.version_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_parse_terminal_accepts_the_three_tokens() {
        assert_eq!(
            VersionStatus::parse_terminal("completed").unwrap(),
            VersionStatus::Completed
        );
        assert_eq!(
            VersionStatus::parse_terminal(" Failed ").unwrap(),
            VersionStatus::Failed
        );
        assert_eq!(
            VersionStatus::parse_terminal("cancelled").unwrap(),
            VersionStatus::Cancelled
        );
    }

    #[test]
    fn test_parse_terminal_rejects_other_tokens() {
        assert!(VersionStatus::parse_terminal("done").is_err());
        assert!(VersionStatus::parse_terminal("in_progress").is_err());
        assert!(VersionStatus::parse_terminal("").is_err());
    }

    #[test]
    fn test_new_version_seeds_pending_stages() {
        let stages = vec!["draft".to_string(), "review".to_string()];
        let version = VersionRecord::new("v1", "build it", &stages, now());

        assert_eq!(version.status, VersionStatus::InProgress);
        assert_eq!(version.stages.len(), 2);
        assert!(version.stages.iter().all(|s| s.status == "pending"));
        assert_eq!(version.stages[0].name, "draft");
    }

    #[test]
    fn test_find_version_not_found_carries_context() {
        let doc = StatusDocument::new("my-agent", now());
        let err = doc.find_version("v-missing").unwrap_err();
        assert!(matches!(err, LifecycleError::VersionNotFound { .. }));
        assert!(err.to_string().contains("my-agent"));
    }

    #[test]
    fn test_status_document_yaml_round_trip() {
        let stages = vec!["draft".to_string()];
        let mut doc = StatusDocument::new("my-agent", now());
        doc.versions
            .push(VersionRecord::new("v20260823143005", "req", &stages, now()));
        doc.current_version = Some("v20260823143005".to_string());
        doc.revision = 3;

        let yaml = serde_yaml::to_string(&doc).unwrap();
        let parsed: StatusDocument = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.project, "my-agent");
        assert_eq!(parsed.revision, 3);
        assert_eq!(parsed.versions.len(), 1);
        assert_eq!(parsed.versions[0].stages[0].name, "draft");
        assert_eq!(
            parsed.current_version.as_deref(),
            Some("v20260823143005")
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let yaml = "project: bare\nlast_updated: 2026-08-23T14:30:05Z\n";
        let parsed: StatusDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.revision, 0);
        assert!(parsed.versions.is_empty());
        assert!(parsed.current_version.is_none());
    }
}
