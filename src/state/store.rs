//! StatusStore - status.yaml CRUD operations

use crate::error::{LifecycleError, LifecycleResult};
use crate::models::StatusDocument;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the status document inside each project directory
pub const STATUS_FILE: &str = "status.yaml";

/// Check that a project name is safe to use as a directory name
///
/// Accepts ASCII letters, digits, `-` and `_`. Everything else (including
/// path separators and whitespace) is rejected so the name can never
/// address anything outside the store root.
pub fn validate_project_name(name: &str) -> LifecycleResult<()> {
    if name.is_empty() {
        return Err(LifecycleError::validation("project name must not be empty"));
    }

    let ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(LifecycleError::validation(format!(
            "invalid project name '{}': use ASCII letters, digits, '-' and '_'",
            name
        )));
    }

    Ok(())
}

/// Check that a version id is safe to use as a directory name
///
/// Same charset as project names. Ids normally come from the allocator,
/// but the configured prefix feeds into them and an edited status document
/// can hold anything, so every id is rechecked before it is joined into a
/// path.
pub fn validate_version_id(version_id: &str) -> LifecycleResult<()> {
    if version_id.is_empty() {
        return Err(LifecycleError::validation("version id must not be empty"));
    }

    let ok = version_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(LifecycleError::validation(format!(
            "invalid version id '{}': use ASCII letters, digits, '-' and '_'",
            version_id
        )));
    }

    Ok(())
}

/// Store for the status documents of one project family
///
/// The root is the directory that holds one subdirectory per project
/// (for example `forge/agents`). All reads and writes go through the
/// whole document; `save` enforces a compare-and-swap on the revision
/// counter so concurrent writers cannot silently overwrite each other.
pub struct StatusStore {
    root: PathBuf,
}

impl StatusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding all project directories
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one project
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.root.join(project)
    }

    /// Path of a project's status document
    pub fn status_path(&self, project: &str) -> PathBuf {
        self.project_dir(project).join(STATUS_FILE)
    }

    /// True if the project has been initialized
    pub fn exists(&self, project: &str) -> bool {
        self.status_path(project).exists()
    }

    /// Create a project directory with a fresh status document
    pub fn init_project(
        &self,
        project: &str,
        now: DateTime<Utc>,
    ) -> LifecycleResult<StatusDocument> {
        validate_project_name(project)?;

        if self.exists(project) {
            return Err(LifecycleError::validation(format!(
                "project '{}' is already initialized",
                project
            )));
        }

        let project_dir = self.project_dir(project);
        std::fs::create_dir_all(&project_dir)
            .map_err(|e| LifecycleError::io(&project_dir, e))?;

        let mut doc = StatusDocument::new(project, now);
        self.save(&mut doc, now)?;
        Ok(doc)
    }

    /// Load a project's status document
    pub fn load(&self, project: &str) -> LifecycleResult<StatusDocument> {
        let path = self.status_path(project);
        if !path.exists() {
            return Err(LifecycleError::ProjectNotFound(project.to_string()));
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| LifecycleError::io(&path, e))?;
        let doc: StatusDocument =
            serde_yaml::from_str(&content).map_err(|e| LifecycleError::CorruptDocument {
                project: project.to_string(),
                source: e,
            })?;

        Ok(doc)
    }

    /// Save a status document, enforcing the revision compare-and-swap
    ///
    /// The on-disk revision must still equal the revision the caller loaded;
    /// otherwise another writer got there first and the caller must reload
    /// and reapply. On success the document's revision is bumped and the
    /// file is replaced atomically via a temp file in the same directory.
    pub fn save(&self, doc: &mut StatusDocument, now: DateTime<Utc>) -> LifecycleResult<()> {
        let path = self.status_path(&doc.project);

        if path.exists() {
            let on_disk = self.load(&doc.project)?;
            if on_disk.revision != doc.revision {
                return Err(LifecycleError::Conflict {
                    project: doc.project.clone(),
                    expected: doc.revision,
                    found: on_disk.revision,
                });
            }
        } else if doc.revision != 0 {
            // The document was loaded from disk but the file is gone.
            return Err(LifecycleError::ProjectNotFound(doc.project.clone()));
        }

        doc.revision += 1;
        doc.last_updated = now;

        let content = serde_yaml::to_string(doc).map_err(|e| LifecycleError::CorruptDocument {
            project: doc.project.clone(),
            source: e,
        })?;

        let parent = path
            .parent()
            .ok_or_else(|| LifecycleError::ProjectNotFound(doc.project.clone()))?;
        let mut temp =
            NamedTempFile::new_in(parent).map_err(|e| LifecycleError::io(parent, e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| LifecycleError::io(&path, e))?;
        temp.flush().map_err(|e| LifecycleError::io(&path, e))?;
        temp.persist(&path)
            .map_err(|e| LifecycleError::io(&path, e.error))?;

        Ok(())
    }

    /// List initialized projects under the root, sorted by name
    ///
    /// Directories without a status document are skipped, so a half-created
    /// or foreign directory never shows up as a project.
    pub fn list_projects(&self) -> LifecycleResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries =
            std::fs::read_dir(&self.root).map_err(|e| LifecycleError::io(&self.root, e))?;

        let mut projects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LifecycleError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.join(STATUS_FILE).exists() {
                projects.push(name.to_string());
            }
        }

        projects.sort();
        Ok(projects)
    }
}

// =============================================================================
// Tests
// =============================================================================
