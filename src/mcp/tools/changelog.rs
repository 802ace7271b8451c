//! Change Log MCP Tool
//!
//! Append-only audit entries on a version, mirrored to `change_log.md`.

use super::{get_optional_string, get_required_string, manager_for, ToolDefinition};
use crate::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Get the tool definition for append_change_log
pub fn append_definition() -> ToolDefinition {
    ToolDefinition {
        name: "append_change_log".to_string(),
        description: "Append an immutable change log entry to a version and refresh the human-readable change_log.md mirror".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "title", "description"],
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
                "title": {
                    "type": "string",
                    "description": "One-line title of the change"
                },
                "description": {
                    "type": "string",
                    "description": "What was done and why"
                },
                "stage": {
                    "type": "string",
                    "description": "Stage this change belongs to (name or alias)"
                }
            }
        }),
    }
}

/// Execute the append_change_log tool
pub fn execute_append(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let title = get_required_string(args, "title")?;
    let description = get_required_string(args, "description")?;
    let stage = get_optional_string(args, "stage");
    let manager = manager_for(args, workspace_root)?;

    let entry =
        manager.append_change_log(&project, &version_id, &title, &description, stage.as_deref())?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "title": entry.title,
        "stage": entry.stage,
        "updated_at": entry.created_at.to_rfc3339(),
    })
    .to_string())
}

#[cfg(test)]
mod tests {
    use super::super::{project, version};
    use super::*;
    use tempfile::TempDir;

    fn setup_version(root: &Path) -> String {
        project::execute_init(&json!({"kind": "agent", "project": "scribe"}), root).unwrap();
        let args = json!({
            "kind": "agent",
            "project": "scribe",
            "request": "summarize notes"
        });
        let result = version::execute_initialize(&args, root).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();
        envelope["version_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_append_with_stage_alias() {
        let temp_dir = TempDir::new().unwrap();
        let version_id = setup_version(temp_dir.path());

        let args = json!({
            "kind": "agent",
            "project": "scribe",
            "version_id": version_id,
            "title": "Switched prompt tone",
            "description": "Rewrote the system prompt to be more direct.",
            "stage": "prompts"
        });
        let result = execute_append(&args, temp_dir.path()).unwrap();
        let envelope: Value = serde_json::from_str(&result).unwrap();

        assert_eq!(envelope["result"], "success");
        assert_eq!(envelope["stage"], "prompt_generation");

        let mirror = temp_dir
            .path()
            .join("forge/agents/scribe")
            .join(&version_id)
            .join("change_log.md");
        let content = std::fs::read_to_string(mirror).unwrap();
        assert!(content.contains("Switched prompt tone"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let version_id = setup_version(temp_dir.path());

        let args = json!({
            "kind": "agent",
            "project": "scribe",
            "version_id": version_id,
            "title": "   ",
            "description": "something"
        });
        let err = execute_append(&args, temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("title"));
    }
}
