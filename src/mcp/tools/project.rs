//! Project MCP Tools
//!
//! Bootstrap and inspection of whole projects.

use super::{get_required_string, manager_for, ToolDefinition};
use crate::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;

/// Get the tool definition for init_project
pub fn init_definition() -> ToolDefinition {
    ToolDefinition {
        name: "init_project".to_string(),
        description: "Initialize a new agent or tool project with an empty status document"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                },
                "project": {
                    "type": "string",
                    "description": "Project name (ASCII letters, digits, '-', '_')"
                }
            }
        }),
    }
}

/// Execute the init_project tool
pub fn execute_init(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let manager = manager_for(args, workspace_root)?;

    let doc = manager.init_project(&project)?;

    Ok(json!({
        "result": "success",
        "project": doc.project,
        "status_path": manager.store().status_path(&doc.project).display().to_string(),
        "updated_at": doc.last_updated.to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for get_project_status
pub fn status_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_project_status".to_string(),
        description: "Read the full status document of a project: all versions, stages, and change logs".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                },
                "project": {
                    "type": "string",
                    "description": "Project name"
                }
            }
        }),
    }
}

/// Execute the get_project_status tool
pub fn execute_status(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let manager = manager_for(args, workspace_root)?;

    let doc = manager.project_status(&project)?;

    Ok(json!({
        "result": "success",
        "project": doc.project,
        "revision": doc.revision,
        "current_version": doc.current_version,
        "versions": serde_json::to_value(&doc.versions)?,
        "updated_at": doc.last_updated.to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for list_projects
pub fn list_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_projects".to_string(),
        description: "List all initialized projects of one family".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind"],
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["agent", "tool"],
                    "description": "Project family: 'agent' or 'tool'"
                }
            }
        }),
    }
}

/// Execute the list_projects tool
pub fn execute_list(args: &Value, workspace_root: &Path) -> Result<String> {
    let manager = manager_for(args, workspace_root)?;

    let projects = manager.list_projects()?;
    let count = projects.len();

    Ok(json!({
        "result": "success",
        "projects": projects,
        "count": count,
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}
