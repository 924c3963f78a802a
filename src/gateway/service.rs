//! Trading tool service
//!
//! Bridges the tool registry to the wire protocol: catalogue definitions
//! become tool specs, execution outcomes become call results with the
//! structured error payload inline.

use algodesk_mcp::{ServerInfo, ToolCallResult, ToolService, ToolSpec};
use algodesk_tools::ToolRegistry;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// [`ToolService`] over the trading tool registry
pub struct TradingToolService {
    registry: ToolRegistry,
}

impl TradingToolService {
    /// Wrap a populated registry
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl ToolService for TradingToolService {
    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: "openalgo".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    fn list_tools(&self) -> Vec<ToolSpec> {
        self.registry
            .list_definitions()
            .into_iter()
            .map(|def| ToolSpec {
                name: def.name,
                description: def.description,
                input_schema: def.parameters,
            })
            .collect()
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult {
        let start = Instant::now();
        let outcome = self.registry.execute(name, arguments).await;
        let is_error = outcome.is_failure();

        info!(
            tool = %name,
            success = !is_error,
            duration_ms = start.elapsed().as_millis() as u64,
            "Tool call completed"
        );

        let payload = outcome.to_json().to_string();
        if is_error {
            ToolCallResult::error(payload)
        } else {
            ToolCallResult::text(payload)
        }
    }
}
