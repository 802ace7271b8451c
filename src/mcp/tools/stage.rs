//! Stage MCP Tools
//!
//! Stage progress records and their documents. Stage names accept the
//! pipeline's aliases (for example `prompts` for `prompt_generation`).

use super::{
    get_optional_string, get_optional_string_array, get_required_string, get_required_value,
    manager_for, ToolDefinition,
};
use crate::lifecycle::StageUpdate;
use crate::Result;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;

/// Get the tool definition for register_stage
pub fn register_definition() -> ToolDefinition {
    ToolDefinition {
        name: "register_stage".to_string(),
        description: "Create or update the progress record of one pipeline stage (idempotent upsert keyed by canonical stage name)".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "stage", "status"],
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
                "stage": {
                    "type": "string",
                    "description": "Stage name or alias, e.g. 'code_generation' or 'code'"
                },
                "status": {
                    "type": "string",
                    "description": "Progress token, e.g. 'pending', 'in_progress', 'completed', 'blocked'"
                },
                "summary": {
                    "type": "string",
                    "description": "Short summary of the stage outcome"
                },
                "doc_path": {
                    "type": "string",
                    "description": "Stage document path, relative to the version directory"
                },
                "artifacts": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Files this stage produced, relative to the version directory"
                }
            }
        }),
    }
}

/// Execute the register_stage tool
pub fn execute_register(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let manager = manager_for(args, workspace_root)?;

    let mut update = StageUpdate::new(
        get_required_string(args, "stage")?,
        get_required_string(args, "status")?,
    );
    update.summary = get_optional_string(args, "summary");
    update.doc_path = get_optional_string(args, "doc_path");
    update.artifacts = get_optional_string_array(args, "artifacts")?;

    let record = manager.register_stage(&project, &version_id, &update)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "stage": record.name,
        "status": record.status,
        "summary": record.summary,
        "doc_path": record.doc_path,
        "updated_at": record.updated_at.to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for write_stage_document
pub fn write_document_definition() -> ToolDefinition {
    ToolDefinition {
        name: "write_stage_document".to_string(),
        description: "Write the document of one stage and mark the stage in_progress. Structured content is stored as pretty JSON, plain text as markdown".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "stage", "content"],
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
                "stage": {
                    "type": "string",
                    "description": "Stage name or alias"
                },
                "content": {
                    "description": "Document content: an object/array is stored as JSON, a string verbatim as markdown"
                }
            }
        }),
    }
}

/// Execute the write_stage_document tool
pub fn execute_write_document(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let stage = get_required_string(args, "stage")?;
    let content = get_required_value(args, "content")?;
    let manager = manager_for(args, workspace_root)?;

    let record = manager.write_stage_document(&project, &version_id, &stage, &content)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "stage": record.name,
        "status": record.status,
        "doc_path": record.doc_path,
        "checksum": record.checksum,
        "updated_at": record.updated_at.to_rfc3339(),
    })
    .to_string())
}

/// Get the tool definition for get_stage_document
pub fn get_document_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_stage_document".to_string(),
        description: "Read back the document recorded for one stage".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["kind", "project", "version_id", "stage"],
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
                "stage": {
                    "type": "string",
                    "description": "Stage name or alias"
                }
            }
        }),
    }
}

/// Execute the get_stage_document tool
pub fn execute_get_document(args: &Value, workspace_root: &Path) -> Result<String> {
    let project = get_required_string(args, "project")?;
    let version_id = get_required_string(args, "version_id")?;
    let stage = get_required_string(args, "stage")?;
    let manager = manager_for(args, workspace_root)?;

    let doc = manager.get_stage_document(&project, &version_id, &stage)?;

    Ok(json!({
        "result": "success",
        "project": project,
        "version_id": version_id,
        "stage": doc.stage,
        "doc_path": doc.doc_path,
        "content": doc.content,
        "updated_at": Utc::now().to_rfc3339(),
    })
    .to_string())
}
