//! Version MCP Tools
//!
//! The version state machine: initialize, finalize, reopen.

use super::{get_optional_string_array, get_required_string, manager_for, ToolDefinition};
use crate::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;

/// Get the tool definition for initialize_version
pub fn initialize_definition() -> ToolDefinition {
    ToolDefinition {
        name: "initialize_version".to_string(),
        description: "Start a new version of a project: allocates a version id, seeds one pending record per pipeline stage, and creates the version's working directory".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "request"],
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
                "request": {
                    "type": "string",
                    "description": "The request text that starts this version"
                }
            }
        }),
    }
}

/// Execute the initialize_version tool
pub fn execute_initialize(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let request = get_required_string(args, "request")?;
    let manager = manager_for(args, workspace_root)?;

    let record = manager.initialize_version(&project, &request)?;
    let stages: Vec<&str> = record.stages.iter().map(|s| s.name.as_str()).collect();

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": record.version_id,
        "status": record.status.as_str(),
        "stages": stages,
        "updated_at": record.created_at.to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for finalize_version
pub fn finalize_definition() -> ToolDefinition {
    ToolDefinition {
        name: "finalize_version".to_string(),
        description: "Close a version with a terminal status (completed, failed, or cancelled), a summary, and optionally the list of produced artifacts".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "summary", "status"],
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
                "summary": {
                    "type": "string",
                    "description": "Closing summary of what this version did"
                },
                "status": {
                    "type": "string",
                    "enum": ["completed", "failed", "cancelled"],
                    "description": "Terminal status"
                },
                "artifacts": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Files produced, relative to the version directory"
                }
            }
        }),
    }
}

/// Execute the finalize_version tool
pub fn execute_finalize(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let summary = get_required_string(args, "summary")?;
    let status = get_required_string(args, "status")?;
    let artifacts = get_optional_string_array(args, "artifacts")?;
    let manager = manager_for(args, workspace_root)?;

    let record = manager.finalize_version(&project, &version_id, &summary, &status, artifacts)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": record.version_id,
        "status": record.status.as_str(),
        "summary": record.summary,
        "artifacts": record.artifacts,
        "updated_at": record.closed_at.map(|t| t.to_rfc3339()),
    })
    .to_string())
}

/// Get the tool definition for reopen_version
pub fn reopen_definition() -> ToolDefinition {
    ToolDefinition {
        name: "reopen_version".to_string(),
        description: "Return a finalized version to in_progress so its stages can be reworked"
            .to_string(),
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

/// Execute the reopen_version tool
pub fn execute_reopen(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let manager = manager_for(args, workspace_root)?;

    let record = manager.reopen_version(&project, &version_id)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": record.version_id,
        "status": record.status.as_str(),
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}
