//! Version File MCP Tools
//!
//! Sandboxed reads and writes under one version's working directory. Every
//! path is checked against the version directory before the filesystem is
//! touched.

use super::{get_required_string, manager_for, ToolDefinition};
use crate::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;

/// Get the tool definition for write_version_file
pub fn write_definition() -> ToolDefinition {
    ToolDefinition {
        name: "write_version_file".to_string(),
        description: "Write a file under the version's working directory (overwrites, creates parent directories). Paths escaping the directory are rejected".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "path", "content"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                },
                "project": {
                    "type": "string",
                    "description": "Project name"
                },
                "version_id": {
                    "type": "string",
                    "description": "Version identifier"
                },
                "path": {
                    "type": "string",
                    "description": "Path relative to the version directory, e.g. 'src/tool.py'"
                },
                "content": {
                    "type": "string",
                    "description": "File content, written verbatim"
                }
            }
        }),
    }
}

/// Execute the write_version_file tool
pub fn execute_write(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let path = get_required_string(args, "path")?;
    let content = get_required_string(args, "content")?;
    let manager = manager_for(args, workspace_root)?;

    let written = manager.write_version_file(&project, &version_id, &path, &content)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "path": written,
        "bytes": content.len(),
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for get_version_file
pub fn get_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_version_file".to_string(),
        description: "Read a file from the version's working directory".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "path"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                },
                "project": {
                    "type": "string",
                    "description": "Project name"
                },
                "version_id": {
                    "type": "string",
                    "description": "Version identifier"
                },
                "path": {
                    "type": "string",
                    "description": "Path relative to the version directory"
                }
            }
        }),
    }
}

/// Execute the get_version_file tool
pub fn execute_get(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let path = get_required_string(args, "path")?;
    let manager = manager_for(args, workspace_root)?;

    let content = manager.get_version_file(&project, &version_id, &path)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "path": path,
        "content": content,
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for list_version_files
pub fn list_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_version_files".to_string(),
        description: "List all files under the version's working directory, sorted by relative path".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                },
                "project": {
                    "type": "string",
                    "description": "Project name"
                },
                "version_id": {
                    "type": "string",
                    "description": "Version identifier"
                }
            }
        }),
    }
}

/// Execute the list_version_files tool
pub fn execute_list(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let manager = manager_for(args, workspace_root)?;

    let files = manager.list_version_files(&project, &version_id)?;
    let count = files.len();

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "files": files,
        "count": count,
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}

#[cfg(test)]
mod tests {
    use super::super::{project, version};
    use super::*;
    use tempfile::TempDir;

    fn setup_version(root: &Path) -> String {
        project::execute_init(&json!({"kind": "tool", "project": "fetcher"}), root).unwrap();
        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "request": "fetch urls"
        });
        let result = version::execute_initialize(&args, root).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();
        envelope["version_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_write_list_get() {
        let temp_dir = TempDir::new().unwrap();
        let version_id = setup_version(temp_dir.path());

        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "version_id": version_id,
            "path": "src/fetcher.py",
            "content": "import requests\n"
        });
        let result = execute_write(&args, temp_dir.path()).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(envelope["path"], "src/fetcher.py");
        assert_eq!(envelope["bytes"], 16);

        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "version_id": version_id
        });
        let result = execute_list(&args, temp_dir.path()).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(envelope["files"], json!(["src/fetcher.py"]));

        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "version_id": version_id,
            "path": "src/fetcher.py"
        });
        let result = execute_get(&args, temp_dir.path()).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(envelope["content"], "import requests\n");
    }

    #[test]
    fn test_escape_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let version_id = setup_version(temp_dir.path());

        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "version_id": version_id,
            "path": "../../../etc/passwd",
            "content": "x"
        });
        let err = execute_write(&args, temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }

    #[test]
    fn test_get_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let version_id = setup_version(temp_dir.path());

        let args = json!({
            "kind": "tool",
            "project": "fetcher",
            "version_id": version_id,
            "path": "never-written.txt"
        });
        let err = execute_get(&args, temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
