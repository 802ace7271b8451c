//! Path containment for project working directories
//!
//! Every file operation against a project or version directory goes through
//! a sandbox that resolves the caller-supplied relative path and rejects
//! anything that would land outside the root. The check runs before any
//! filesystem side effect.

use crate::error::{LifecycleError, LifecycleResult};
use std::path::{Component, Path, PathBuf};

/// A filesystem sandbox rooted at one directory
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    /// Open a sandbox rooted at an existing directory
    ///
    /// The root is canonicalized up front so prefix checks cannot be
    /// bypassed through symlinks.
    pub fn new(root: impl AsRef<Path>) -> LifecycleResult<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| LifecycleError::io(root, e))?;
        Ok(Self { root })
    }

    /// The canonical sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path inside the sandbox
    ///
    /// Rejects empty input (`Validation`), absolute input and any path that
    /// escapes the root after `.`/`..` normalization and symlink resolution
    /// (`SecurityViolation`). Pure: nothing is read or written.
    pub fn resolve(&self, relative: &str) -> LifecycleResult<PathBuf> {
        let trimmed = relative.trim();
        if trimmed.is_empty() {
            return Err(LifecycleError::validation("path must not be empty"));
        }

        let requested = Path::new(trimmed);
        if requested.is_absolute() {
            return Err(LifecycleError::SecurityViolation {
                path: trimmed.to_string(),
            });
        }

        // Lexical normalization: a `..` that climbs past the root is an
        // escape attempt no matter what the filesystem looks like.
        let mut normalized = PathBuf::new();
        for component in requested.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(LifecycleError::SecurityViolation {
                            path: trimmed.to_string(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(LifecycleError::SecurityViolation {
                        path: trimmed.to_string(),
                    });
                }
            }
        }

        let candidate = self.root.join(&normalized);

        // A symlinked intermediate directory can still point outside the
        // root, so resolve the longest existing prefix before the
        // containment check.
        let resolved = resolve_existing_prefix(&candidate);
        if resolved != self.root && !resolved.starts_with(&self.root) {
            return Err(LifecycleError::SecurityViolation {
                path: trimmed.to_string(),
            });
        }

        Ok(resolved)
    }

    /// Sandbox-relative form of a resolved path, with forward slashes
    pub fn relative_display(&self, resolved: &Path) -> String {
        resolved
            .strip_prefix(&self.root)
            .unwrap_or(resolved)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Canonicalize the deepest existing ancestor of `candidate` and re-append
/// the non-existing remainder
fn resolve_existing_prefix(candidate: &Path) -> PathBuf {
    let mut existing = candidate;
    let mut remainder: Vec<std::ffi::OsString> = Vec::new();

    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                remainder.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for part in remainder.iter().rev() {
        resolved.push(part);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_sandbox() -> (TempDir, PathSandbox) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("version");
        std::fs::create_dir_all(&root).unwrap();
        let sandbox = PathSandbox::new(&root).unwrap();
        (temp_dir, sandbox)
    }

    #[test]
    fn test_resolve_simple_relative_path() {
        let (_temp, sandbox) = setup_sandbox();

        let resolved = sandbox.resolve("notes.md").unwrap();
        assert_eq!(resolved, sandbox.root().join("notes.md"));
        assert_eq!(sandbox.relative_display(&resolved), "notes.md");
    }

    #[test]
    fn test_resolve_nested_path_is_pure() {
        let (_temp, sandbox) = setup_sandbox();

        let resolved = sandbox.resolve("src/generated/agent.py").unwrap();
        assert_eq!(
            sandbox.relative_display(&resolved),
            "src/generated/agent.py"
        );
        // Resolution must not create anything.
        assert!(!sandbox.root().join("src").exists());
    }

    #[test]
    fn test_parent_escape_rejected() {
        let (_temp, sandbox) = setup_sandbox();

        let err = sandbox.resolve("../../escape.txt").unwrap_err();
        assert!(matches!(err, LifecycleError::SecurityViolation { .. }));
    }

    #[test]
    fn test_interior_parent_escape_rejected() {
        let (_temp, sandbox) = setup_sandbox();

        let err = sandbox.resolve("docs/../../outside.txt").unwrap_err();
        assert!(matches!(err, LifecycleError::SecurityViolation { .. }));
    }

    #[test]
    fn test_interior_parent_within_root_allowed() {
        let (_temp, sandbox) = setup_sandbox();

        let resolved = sandbox.resolve("docs/../notes.md").unwrap();
        assert_eq!(sandbox.relative_display(&resolved), "notes.md");
    }

    #[test]
    fn test_absolute_path_rejected() {
        let (_temp, sandbox) = setup_sandbox();

        let err = sandbox.resolve("/etc/passwd").unwrap_err();
        assert!(matches!(err, LifecycleError::SecurityViolation { .. }));
    }

    #[test]
    fn test_empty_path_is_validation_error() {
        let (_temp, sandbox) = setup_sandbox();

        let err = sandbox.resolve("   ").unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }

    #[test]
    fn test_dot_resolves_to_root() {
        let (_temp, sandbox) = setup_sandbox();

        let resolved = sandbox.resolve(".").unwrap();
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_missing_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        assert!(PathSandbox::new(&missing).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("version");
        let outside = temp_dir.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let sandbox = PathSandbox::new(&root).unwrap();
        let err = sandbox.resolve("link/secrets.txt").unwrap_err();
        assert!(matches!(err, LifecycleError::SecurityViolation { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("version");
        std::fs::create_dir_all(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let sandbox = PathSandbox::new(&root).unwrap();
        let resolved = sandbox.resolve("alias/file.txt").unwrap();
        assert!(resolved.starts_with(sandbox.root()));
        assert_eq!(sandbox.relative_display(&resolved), "real/file.txt");
    }
}
