//! Error types for algodesk-mcp

use thiserror::Error;

/// MCP error type
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport error (I/O, connection, process)
    #[error("transport error: {0}")]
    Transport(String),

    /// Protocol error (invalid JSON-RPC)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server returned an error
    #[error("server error {code}: {message}")]
    Server {
        /// JSON-RPC error code
        code: i32,
        /// Error message
        message: String,
    },

    /// Timeout waiting for a response
    #[error("request timed out")]
    Timeout,

    /// Tool not found on the server
    #[error("tool '{0}' not found")]
    ToolNotFound(String),
}

/// MCP result type
pub type McpResult<T> = std::result::Result<T, McpError>;
