//! High-level MCP client
//!
//! Wraps a transport, performs the initialize handshake, caches the tool
//! catalogue, and exposes `call_tool`. One client is shared by every relay
//! session; requests are correlated by id so concurrent calls need no
//! mutual exclusion beyond the transport's pending map.

use crate::error::{McpError, McpResult};
use crate::protocol::{
    InitializeResult, RpcRequest, RpcResponse, ServerInfo, ToolCallResult, ToolSpec,
    PROTOCOL_VERSION,
};
use crate::sse::SseTransport;
use crate::stdio::StdioTransport;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// How long a request may wait for its response
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests in flight, keyed by id
pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<RpcResponse>>>>;

/// Deliver a response to whoever is waiting on its id.
pub(crate) fn complete_pending(pending: &PendingMap, response: RpcResponse) {
    // Recover from a poisoned mutex so responses are still delivered even if
    // another thread panicked while holding the lock
    let mut pending = pending.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(sender) = pending.remove(&response.id) {
        let _ = sender.send(response);
    }
}

/// A client-side transport to a tool server
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the matching response
    async fn request(&self, request: RpcRequest) -> McpResult<RpcResponse>;

    /// Send a notification (no response expected)
    async fn notify(&self, request: RpcRequest) -> McpResult<()>;

    /// Allocate the next request id
    fn next_id(&self) -> u64;

    /// Whether the transport is still usable
    fn is_active(&self) -> bool;

    /// Human-readable endpoint description for status reporting
    fn describe(&self) -> String;
}

/// MCP client over stdio or SSE
pub struct McpClient {
    transport: Box<dyn Transport>,
    tools: RwLock<Vec<ToolSpec>>,
    server: RwLock<Option<ServerInfo>>,
}

impl McpClient {
    /// Connect to a gateway served over SSE at `base_url`
    /// (e.g. `http://localhost:8001`).
    pub async fn connect_sse(base_url: &str) -> McpResult<Self> {
        let transport = SseTransport::connect(base_url).await?;
        Self::with_transport(Box::new(transport)).await
    }

    /// Spawn a gateway child process and connect over its stdio pipe.
    pub async fn connect_stdio(command: &str, args: &[String]) -> McpResult<Self> {
        let transport = StdioTransport::spawn(command, args)?;
        Self::with_transport(Box::new(transport)).await
    }

    async fn with_transport(transport: Box<dyn Transport>) -> McpResult<Self> {
        let client = Self {
            transport,
            tools: RwLock::new(Vec::new()),
            server: RwLock::new(None),
        };
        client.initialize().await?;
        client.refresh_tools().await?;
        Ok(client)
    }

    /// Perform the initialize handshake
    async fn initialize(&self) -> McpResult<()> {
        let request = RpcRequest::new("initialize", self.transport.next_id()).with_params(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "clientInfo": {
                "name": "algodesk",
                "version": env!("CARGO_PKG_VERSION"),
            }
        }));

        let response = self.transport.request(request).await?;
        let result = response
            .result
            .ok_or_else(|| McpError::Protocol("initialize returned no result".to_string()))?;
        let init: InitializeResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("failed to parse init result: {e}")))?;

        debug!(
            protocol = %init.protocol_version,
            server = ?init.server_info.as_ref().map(|s| s.name.clone()),
            "Tool server initialized"
        );

        *self.server.write().unwrap_or_else(|e| e.into_inner()) = init.server_info;

        self.transport
            .notify(RpcRequest::notification("notifications/initialized"))
            .await?;

        Ok(())
    }

    /// Fetch the tool catalogue from the server and refresh the cache
    pub async fn refresh_tools(&self) -> McpResult<Vec<ToolSpec>> {
        let request = RpcRequest::new("tools/list", self.transport.next_id());
        let response = self.transport.request(request).await?;

        #[derive(Deserialize)]
        struct ToolsResult {
            tools: Vec<ToolSpec>,
        }

        let tools = match response.result {
            Some(result) => {
                let parsed: ToolsResult = serde_json::from_value(result)
                    .map_err(|e| McpError::Protocol(format!("failed to parse tools: {e}")))?;
                parsed.tools
            }
            None => Vec::new(),
        };

        info!(tools = tools.len(), "Tool catalogue refreshed");
        *self.tools.write().unwrap_or_else(|e| e.into_inner()) = tools.clone();
        Ok(tools)
    }

    /// The cached tool catalogue
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolSpec> {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Name reported by the server during initialize
    #[must_use]
    pub fn server_name(&self) -> Option<String> {
        self.server
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|info| info.name.clone())
    }

    /// Endpoint description for status reporting
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.transport.describe()
    }

    /// Whether the underlying transport is still usable
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_active()
    }

    /// Call a tool by name.
    ///
    /// Unknown names are rejected locally against the cached catalogue; a
    /// failed call comes back as `is_error` inside the result, never as a
    /// transport fault.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpResult<ToolCallResult> {
        let known = self
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|tool| tool.name == name);
        if !known {
            return Err(McpError::ToolNotFound(name.to_string()));
        }

        let request = RpcRequest::new("tools/call", self.transport.next_id()).with_params(json!({
            "name": name,
            "arguments": arguments,
        }));

        let response = self.transport.request(request).await?;

        match response.result {
            Some(result) => serde_json::from_value(result)
                .map_err(|e| McpError::Protocol(format!("failed to parse tool result: {e}"))),
            None => Ok(ToolCallResult::error("no result returned")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_pending_delivers_by_id() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx, mut rx) = oneshot::channel();
        pending.lock().unwrap().insert(7, tx);

        complete_pending(&pending, RpcResponse::success(7, json!({"ok": true})));

        let response = rx.try_recv().unwrap();
        assert_eq!(response.id, 7);
        assert!(pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_complete_pending_ignores_unknown_id() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        complete_pending(&pending, RpcResponse::success(42, json!({})));
        assert!(pending.lock().unwrap().is_empty());
    }
}
