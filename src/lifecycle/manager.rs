//! LifecycleManager - versioned build workflow operations

use crate::checksum::{calculate_checksum, is_stale};
use crate::config::{ProjectKind, WorkspaceConfig};
use crate::error::{LifecycleError, LifecycleResult};
use crate::idgen::allocate_id;
use crate::models::{ChangeLogEntry, StageRecord, StatusDocument, VersionRecord, VersionStatus};
use crate::sandbox::PathSandbox;
use crate::stages::StageRegistry;
use crate::state::{validate_version_id, StatusStore};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Retry budget for conflicting saves when no config is supplied
const DEFAULT_SAVE_RETRIES: u32 = 3;

/// Human-readable mirror of a version's change log
pub const CHANGE_LOG_FILE: &str = "change_log.md";

/// Closing summary written by finalize
pub const SUMMARY_FILE: &str = "summary.md";

/// Field set applied by `register_stage`
///
/// `stage` and `status` are required; optional fields overwrite the stored
/// record only when provided.
#[derive(Debug, Clone)]
pub struct StageUpdate {
    pub stage: String,
    pub status: String,
    pub doc_path: Option<String>,
    pub summary: Option<String>,
    pub artifacts: Option<Vec<String>>,
    pub checksum: Option<String>,
}

impl StageUpdate {
    pub fn new(stage: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: status.into(),
            doc_path: None,
            summary: None,
            artifacts: None,
            checksum: None,
        }
    }
}

/// A stage document read back from disk
#[derive(Debug, Clone)]
pub struct StageDocument {
    /// Canonical stage name
    pub stage: String,
    /// Path relative to the version directory
    pub doc_path: String,
    /// Raw file content, byte-identical to what was written
    pub content: String,
}

/// Staleness report for the stage documents of one version
#[derive(Debug, Clone, Default)]
pub struct StalenessReport {
    /// Stages whose document changed on disk since it was recorded
    pub stale_stages: Vec<String>,
    /// Stages with a recorded document that no longer exists
    pub missing_documents: Vec<String>,
    /// Stages whose document still matches its recorded checksum
    pub fresh_stages: Vec<String>,
    /// Stages that never had a document written
    pub unwritten_stages: Vec<String>,
}

impl StalenessReport {
    /// Check if any stage document drifted
    pub fn has_stale(&self) -> bool {
        !self.stale_stages.is_empty()
    }

    /// Check if every written document is intact and current
    pub fn is_fresh(&self) -> bool {
        self.stale_stages.is_empty() && self.missing_documents.is_empty()
    }
}

/// Generic lifecycle manager over one artifacts root
///
/// Every mutation runs a full load-mutate-save cycle against the status
/// document; the store's revision compare-and-swap turns concurrent writes
/// into conflicts, which are retried here with a fresh load.
pub struct LifecycleManager {
    store: StatusStore,
    registry: StageRegistry,
    id_prefix: String,
    save_retries: u32,
}

impl LifecycleManager {
    pub fn new(
        artifacts_root: impl Into<PathBuf>,
        registry: StageRegistry,
        id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store: StatusStore::new(artifacts_root),
            registry,
            id_prefix: id_prefix.into(),
            save_retries: DEFAULT_SAVE_RETRIES,
        }
    }

    /// Production constructor for one project kind
    pub fn for_kind(workspace_root: &Path, config: &WorkspaceConfig, kind: ProjectKind) -> Self {
        let mut manager = Self::new(
            config.artifacts_root(workspace_root, kind),
            config.registry(kind),
            config.id_prefix.clone(),
        );
        manager.save_retries = config.save_retries;
        manager
    }

    /// Stage vocabulary this manager validates against
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Underlying status store
    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Working directory of one version
    ///
    /// The id is validated before the join: ids normally come from the
    /// allocator, but a configured prefix or an edited status document can
    /// put arbitrary text in them.
    pub fn version_dir(&self, project: &str, version_id: &str) -> LifecycleResult<PathBuf> {
        validate_version_id(version_id)?;
        Ok(self.store.project_dir(project).join(version_id))
    }

    // =========================================================================
    // Project surface
    // =========================================================================

    /// Create a project directory with an empty status document
    pub fn init_project(&self, project: &str) -> LifecycleResult<StatusDocument> {
        self.store.init_project(project, Utc::now())
    }

    /// Load the full status document for a project
    pub fn project_status(&self, project: &str) -> LifecycleResult<StatusDocument> {
        self.store.load(project)
    }

    /// Sorted names of initialized projects
    pub fn list_projects(&self) -> LifecycleResult<Vec<String>> {
        self.store.list_projects()
    }

    // =========================================================================
    // Version operations
    // =========================================================================

    /// Start a new version
    ///
    /// Allocates a collision-free id, seeds one pending stage record per
    /// canonical stage, points `current_version` at the new id, and creates
    /// the version's working directory.
    pub fn initialize_version(
        &self,
        project: &str,
        request: &str,
    ) -> LifecycleResult<VersionRecord> {
        let record = self.with_document(project, |doc| {
            let now = Utc::now();
            let version_id = allocate_id(&doc.version_ids(), &self.id_prefix, now);
            // The prefix comes from configuration; reject bad ids before
            // they are persisted.
            validate_version_id(&version_id)?;
            let record = VersionRecord::new(&version_id, request, self.registry.canonical(), now);
            doc.current_version = Some(version_id);
            doc.versions.push(record.clone());
            Ok(record)
        })?;

        let version_dir = self.version_dir(project, &record.version_id)?;
        std::fs::create_dir_all(&version_dir)
            .map_err(|e| LifecycleError::io(&version_dir, e))?;

        Ok(record)
    }

    /// Create or update one stage record (idempotent upsert)
    ///
    /// The stage name is alias-normalized first, so a synonym and its
    /// canonical form always land on the same record.
    pub fn register_stage(
        &self,
        project: &str,
        version_id: &str,
        update: &StageUpdate,
    ) -> LifecycleResult<StageRecord> {
        let stage_name = self.registry.normalize(&update.stage)?;
        let status = update.status.trim();
        if status.is_empty() {
            return Err(LifecycleError::validation("stage status must not be empty"));
        }

        self.with_document(project, |doc| {
            let now = Utc::now();
            let version = doc.find_version_mut(version_id)?;
            ensure_open(version)?;

            let record = match version.find_stage_mut(&stage_name) {
                Some(record) => {
                    record.status = status.to_string();
                    if let Some(doc_path) = &update.doc_path {
                        record.doc_path = Some(doc_path.clone());
                    }
                    if let Some(summary) = &update.summary {
                        record.summary = Some(summary.clone());
                    }
                    if let Some(artifacts) = &update.artifacts {
                        record.artifacts = artifacts.clone();
                    }
                    if let Some(checksum) = &update.checksum {
                        record.checksum = Some(checksum.clone());
                    }
                    record.updated_at = now;
                    record.clone()
                }
                None => {
                    let mut record = StageRecord::pending(&stage_name, now);
                    record.status = status.to_string();
                    record.doc_path = update.doc_path.clone();
                    record.summary = update.summary.clone();
                    record.artifacts = update.artifacts.clone().unwrap_or_default();
                    record.checksum = update.checksum.clone();
                    version.stages.push(record.clone());
                    record
                }
            };

            Ok(record)
        })
    }

    /// Write one file under the version directory (overwrite semantics)
    ///
    /// The relative path is sandbox-checked before the filesystem is
    /// touched. Returns the normalized sandbox-relative path written.
    pub fn write_version_file(
        &self,
        project: &str,
        version_id: &str,
        relative_path: &str,
        content: &str,
    ) -> LifecycleResult<String> {
        let doc = self.store.load(project)?;
        doc.find_version(version_id)?;

        let sandbox = self.open_sandbox(project, version_id)?;
        let resolved = sandbox.resolve(relative_path)?;

        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LifecycleError::io(parent, e))?;
        }
        std::fs::write(&resolved, content).map_err(|e| LifecycleError::io(&resolved, e))?;
        let written = sandbox.relative_display(&resolved);

        // Refresh last_updated on the document.
        self.with_document(project, |doc| doc.find_version_mut(version_id).map(|_| ()))?;

        Ok(written)
    }

    /// Serialize a stage document, write it, and mark the stage in progress
    ///
    /// Structured content lands pretty-printed in `<stage>.json`; plain
    /// string content lands verbatim in `<stage>.md`. The content checksum
    /// is recorded on the stage for later staleness checks.
    pub fn write_stage_document(
        &self,
        project: &str,
        version_id: &str,
        stage: &str,
        content: &Value,
    ) -> LifecycleResult<StageRecord> {
        let stage_name = self.registry.normalize(stage)?;

        {
            let doc = self.store.load(project)?;
            let version = doc.find_version(version_id)?;
            ensure_open(version)?;
        }

        let (doc_path, serialized) = match content {
            Value::String(text) => (format!("{}.md", stage_name), text.clone()),
            other => {
                let pretty = serde_json::to_string_pretty(other).map_err(|e| {
                    LifecycleError::validation(format!("stage document is not serializable: {}", e))
                })?;
                (format!("{}.json", stage_name), format!("{}\n", pretty))
            }
        };

        let checksum = calculate_checksum(&serialized);
        let written = self.write_version_file(project, version_id, &doc_path, &serialized)?;

        let mut update = StageUpdate::new(&stage_name, "in_progress");
        update.doc_path = Some(written);
        update.checksum = Some(checksum);
        self.register_stage(project, version_id, &update)
    }

    /// Read back the document recorded for a stage
    pub fn get_stage_document(
        &self,
        project: &str,
        version_id: &str,
        stage: &str,
    ) -> LifecycleResult<StageDocument> {
        let stage_name = self.registry.normalize(stage)?;

        let doc = self.store.load(project)?;
        let version = doc.find_version(version_id)?;
        let record = version.find_stage(&stage_name)?;
        let doc_path = record.doc_path.clone().ok_or_else(|| {
            LifecycleError::FileNotFound(format!(
                "no document recorded for stage '{}'",
                stage_name
            ))
        })?;

        let content = self.get_version_file(project, version_id, &doc_path)?;
        Ok(StageDocument {
            stage: stage_name,
            doc_path,
            content,
        })
    }

    /// Read one file from the version directory (sandbox-checked)
    pub fn get_version_file(
        &self,
        project: &str,
        version_id: &str,
        relative_path: &str,
    ) -> LifecycleResult<String> {
        let doc = self.store.load(project)?;
        doc.find_version(version_id)?;

        let sandbox = self.open_sandbox(project, version_id)?;
        let resolved = sandbox.resolve(relative_path)?;
        if !resolved.exists() {
            return Err(LifecycleError::FileNotFound(
                sandbox.relative_display(&resolved),
            ));
        }

        std::fs::read_to_string(&resolved).map_err(|e| LifecycleError::io(&resolved, e))
    }

    /// Enumerate files under the version directory, sorted by relative path
    pub fn list_version_files(
        &self,
        project: &str,
        version_id: &str,
    ) -> LifecycleResult<Vec<String>> {
        let doc = self.store.load(project)?;
        doc.find_version(version_id)?;

        let version_dir = self.version_dir(project, version_id)?;
        if !version_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&version_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(rel) = entry.path().strip_prefix(&version_dir) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Append an immutable change log entry and refresh the markdown mirror
    pub fn append_change_log(
        &self,
        project: &str,
        version_id: &str,
        title: &str,
        description: &str,
        stage: Option<&str>,
    ) -> LifecycleResult<ChangeLogEntry> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LifecycleError::validation(
                "change log title must not be empty",
            ));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(LifecycleError::validation(
                "change log description must not be empty",
            ));
        }
        let stage = match stage {
            Some(name) => Some(self.registry.normalize(name)?),
            None => None,
        };
        let version_dir = self.version_dir(project, version_id)?;

        let (entry, log) = self.with_document(project, |doc| {
            let now = Utc::now();
            let version = doc.find_version_mut(version_id)?;
            ensure_open(version)?;

            let entry = ChangeLogEntry {
                title: title.to_string(),
                description: description.to_string(),
                stage: stage.clone(),
                created_at: now,
            };
            version.change_log.push(entry.clone());
            Ok((entry, version.change_log.clone()))
        })?;

        // The document is the source of truth; the mirror is derived.
        std::fs::create_dir_all(&version_dir)
            .map_err(|e| LifecycleError::io(&version_dir, e))?;
        let mirror_path = version_dir.join(CHANGE_LOG_FILE);
        std::fs::write(&mirror_path, render_change_log(version_id, &log))
            .map_err(|e| LifecycleError::io(&mirror_path, e))?;

        Ok(entry)
    }

    /// Close a version with a terminal status and write its summary file
    pub fn finalize_version(
        &self,
        project: &str,
        version_id: &str,
        summary: &str,
        status: &str,
        artifacts: Option<Vec<String>>,
    ) -> LifecycleResult<VersionRecord> {
        let status = VersionStatus::parse_terminal(status)?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(LifecycleError::validation("summary must not be empty"));
        }
        let version_dir = self.version_dir(project, version_id)?;

        let record = self.with_document(project, |doc| {
            let now = Utc::now();
            let version = doc.find_version_mut(version_id)?;
            ensure_open(version)?;

            version.status = status;
            version.summary = Some(summary.to_string());
            version.closed_at = Some(now);
            if let Some(artifacts) = &artifacts {
                version.artifacts = artifacts.clone();
            }
            Ok(version.clone())
        })?;

        std::fs::create_dir_all(&version_dir)
            .map_err(|e| LifecycleError::io(&version_dir, e))?;
        let summary_path = version_dir.join(SUMMARY_FILE);
        std::fs::write(&summary_path, render_summary(&record))
            .map_err(|e| LifecycleError::io(&summary_path, e))?;

        Ok(record)
    }

    /// Return a finalized version to `in_progress`
    pub fn reopen_version(
        &self,
        project: &str,
        version_id: &str,
    ) -> LifecycleResult<VersionRecord> {
        self.with_document(project, |doc| {
            let version = doc.find_version_mut(version_id)?;
            if !version.status.is_terminal() {
                return Err(LifecycleError::validation(format!(
                    "version '{}' is {} and cannot be reopened",
                    version.version_id,
                    version.status.as_str()
                )));
            }

            version.status = VersionStatus::InProgress;
            version.closed_at = None;
            Ok(version.clone())
        })
    }

    /// Compare recorded stage checksums against current file contents
    pub fn stage_staleness(
        &self,
        project: &str,
        version_id: &str,
    ) -> LifecycleResult<StalenessReport> {
        let doc = self.store.load(project)?;
        let version = doc.find_version(version_id)?;
        let sandbox = self.open_sandbox(project, version_id)?;

        let mut report = StalenessReport::default();
        for stage in &version.stages {
            let Some(doc_path) = &stage.doc_path else {
                report.unwritten_stages.push(stage.name.clone());
                continue;
            };

            let resolved = sandbox.resolve(doc_path)?;
            if !resolved.exists() {
                report.missing_documents.push(stage.name.clone());
                continue;
            }

            let content = std::fs::read_to_string(&resolved)
                .map_err(|e| LifecycleError::io(&resolved, e))?;
            match &stage.checksum {
                // A document without a recorded checksum was never verified.
                None => report.stale_stages.push(stage.name.clone()),
                Some(recorded) if is_stale(recorded, &content) => {
                    report.stale_stages.push(stage.name.clone());
                }
                Some(_) => report.fresh_stages.push(stage.name.clone()),
            }
        }

        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run one load-mutate-save cycle, retrying on save conflicts
    fn with_document<T>(
        &self,
        project: &str,
        mut mutate: impl FnMut(&mut StatusDocument) -> LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        let mut attempts = 0;
        loop {
            let mut doc = self.store.load(project)?;
            let value = mutate(&mut doc)?;
            match self.store.save(&mut doc, Utc::now()) {
                Ok(()) => return Ok(value),
                Err(LifecycleError::Conflict { .. }) if attempts < self.save_retries => {
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sandbox rooted at the version directory
    fn open_sandbox(&self, project: &str, version_id: &str) -> LifecycleResult<PathSandbox> {
        let version_dir = self.version_dir(project, version_id)?;
        std::fs::create_dir_all(&version_dir)
            .map_err(|e| LifecycleError::io(&version_dir, e))?;
        PathSandbox::new(version_dir)
    }
}

/// Reject mutation of a version that reached a terminal status
fn ensure_open(version: &VersionRecord) -> LifecycleResult<()> {
    if version.status.is_terminal() {
        return Err(LifecycleError::validation(format!(
            "version '{}' is {}: reopen it before making changes",
            version.version_id,
            version.status.as_str()
        )));
    }
    Ok(())
}

/// Render the human-readable change log mirror
fn render_change_log(version_id: &str, entries: &[ChangeLogEntry]) -> String {
    let mut out = format!("# Change Log: {}\n", version_id);
    for entry in entries {
        out.push_str(&format!("\n## {}\n\n", entry.title));
        out.push_str(&format!("- at: {}\n", entry.created_at.to_rfc3339()));
        if let Some(stage) = &entry.stage {
            out.push_str(&format!("- stage: {}\n", stage));
        }
        out.push_str(&format!("\n{}\n", entry.description));
    }
    out
}

/// Render the closing summary file
fn render_summary(version: &VersionRecord) -> String {
    let mut out = format!("# Version {}\n\n", version.version_id);
    out.push_str(&format!("- status: {}\n", version.status.as_str()));
    if let Some(closed_at) = version.closed_at {
        out.push_str(&format!("- closed: {}\n", closed_at.to_rfc3339()));
    }
    if !version.artifacts.is_empty() {
        out.push_str("- artifacts:\n");
        for artifact in &version.artifacts {
            out.push_str(&format!("  - {}\n", artifact));
        }
    }
    if let Some(summary) = &version.summary {
        out.push_str(&format!("\n{}\n", summary));
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
