//! Algodesk MCP - the tool wire protocol
//!
//! JSON-RPC 2.0 types for publishing and calling tools, the [`ToolService`]
//! trait a tool server implements, a transport-agnostic dispatcher, and the
//! two client transports the relay uses to reach the gateway:
//!
//! - stdio: the gateway runs as a child process, one JSON-RPC message per line
//! - SSE: the gateway runs as an HTTP server; responses arrive over a
//!   server-sent event stream, requests are POSTed to a per-session endpoint

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod protocol;
pub mod service;
pub mod sse;
pub mod stdio;

pub use client::McpClient;
pub use error::{McpError, McpResult};
pub use protocol::{
    ContentItem, InitializeResult, RpcError, RpcRequest, RpcResponse, ServerInfo, ToolCallResult,
    ToolSpec, PROTOCOL_VERSION,
};
pub use service::{dispatch, ToolService};
pub use sse::SseTransport;
pub use stdio::StdioTransport;
