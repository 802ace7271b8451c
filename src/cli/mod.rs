//! CLI command implementations

pub mod init;
pub mod list;
pub mod log;
pub mod mcp_server;
pub mod status;
