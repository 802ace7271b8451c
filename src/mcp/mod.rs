//! MCP (Model Context Protocol) Server for Forged
//!
//! Exposes every lifecycle operation as a structured tool, so the
//! orchestrating agent records progress through typed calls instead of
//! editing state files by hand.
//!
//! ## Tools
//! - `init_project` / `get_project_status` / `list_projects` - project surface
//! - `initialize_version` / `finalize_version` / `reopen_version` - version state machine
//! - `register_stage` / `write_stage_document` / `get_stage_document` - stage progress
//! - `write_version_file` / `get_version_file` / `list_version_files` - sandboxed files
//! - `append_change_log` - audit trail

pub mod server;
pub mod tools;

pub use server::McpServer;
