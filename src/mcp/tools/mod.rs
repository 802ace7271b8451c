//! MCP Tool Registry and Implementations
//!
//! Each tool wraps one lifecycle operation and returns a JSON result
//! envelope, so the calling agent gets structured output instead of prose.

pub mod changelog;
pub mod files;
pub mod project;
pub mod stage;
pub mod version;

use crate::config::{ProjectKind, WorkspaceConfig};
use crate::lifecycle::LifecycleManager;
use crate::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Registry of available MCP tools
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

/// Tool definition for MCP protocol
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolRegistry {
    /// Create a new tool registry with all available tools
    pub fn new() -> Self {
        Self {
            tools: vec![
                project::init_definition(),
                project::status_definition(),
                project::list_definition(),
                version::initialize_definition(),
                version::finalize_definition(),
                version::reopen_definition(),
                stage::register_definition(),
                stage::write_document_definition(),
                stage::get_document_definition(),
                files::write_definition(),
                files::get_definition(),
                files::list_definition(),
                changelog::append_definition(),
            ],
        }
    }

    /// List all available tools in MCP format
    pub fn list_tools(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name with the given arguments
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &Value,
        workspace_root: &Path,
    ) -> Result<String> {
        match name {
            "init_project" => project::execute_init(arguments, workspace_root),
            "get_project_status" => project::execute_status(arguments, workspace_root),
            "list_projects" => project::execute_list(arguments, workspace_root),
            "initialize_version" => version::execute_initialize(arguments, workspace_root),
            "finalize_version" => version::execute_finalize(arguments, workspace_root),
            "reopen_version" => version::execute_reopen(arguments, workspace_root),
            "register_stage" => stage::execute_register(arguments, workspace_root),
            "write_stage_document" => stage::execute_write_document(arguments, workspace_root),
            "get_stage_document" => stage::execute_get_document(arguments, workspace_root),
            "write_version_file" => files::execute_write(arguments, workspace_root),
            "get_version_file" => files::execute_get(arguments, workspace_root),
            "list_version_files" => files::execute_list(arguments, workspace_root),
            "append_change_log" => changelog::execute_append(arguments, workspace_root),
            _ => anyhow::bail!("Unknown tool: {}", name),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the lifecycle manager selected by the `kind` argument
pub fn manager_for(args: &Value, workspace_root: &Path) -> Result<LifecycleManager> {
    let kind = ProjectKind::parse(&get_required_string(args, "kind")?)?;
    let config = WorkspaceConfig::load(workspace_root)?;
    Ok(LifecycleManager::for_kind(workspace_root, &config, kind))
}

/// Helper to extract a required string field from JSON
pub fn get_required_string(args: &Value, field: &str) -> Result<String> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required field: {}", field))
}

/// Helper to extract an optional string field from JSON
pub fn get_optional_string(args: &Value, field: &str) -> Option<String> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Helper to extract a required field of any JSON type
pub fn get_required_value(args: &Value, field: &str) -> Result<Value> {
    args.get(field)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing required field: {}", field))
}

/// Helper to extract an optional array-of-strings field from JSON
pub fn get_optional_string_array(args: &Value, field: &str) -> Result<Option<Vec<String>>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => anyhow::bail!("Field '{}' must be an array of strings", field),
                }
            }
            Ok(Some(out))
        }
        Some(_) => anyhow::bail!("Field '{}' must be an array of strings", field),
    }
}
