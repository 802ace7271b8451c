use crate::mcp::McpServer;
use crate::Result;

/// Run the MCP server over stdio until the client disconnects
pub async fn run() -> Result<()> {
    let server = McpServer::new()?;
    server.run().await
}
