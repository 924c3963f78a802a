//! Market data tools

use crate::registry::{Tool, ToolDefinition};
use crate::{parse_args, ToolOutcome};
use algodesk_broker::{HistoryParams, OpenAlgoClient, QuoteParams};
use serde_json::{json, Value};
use std::sync::Arc;

fn symbol_exchange_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {"type": "string", "description": "Trading symbol (e.g. SBIN, RELIANCE)"},
            "exchange": {"type": "string", "description": "Exchange (NSE, BSE, NFO, ...)", "default": "NSE"}
        },
        "required": ["symbol"]
    })
}

/// Get market quotes for a symbol
pub struct GetQuoteTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetQuoteTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_quote",
            "Get current market quotes (bid, ask, last price) for a symbol.",
            symbol_exchange_schema(),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetQuoteTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: QuoteParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        self.client.quotes(params).await.into()
    }
}

/// Get market depth (order book) for a symbol
pub struct GetDepthTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetDepthTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_depth",
            "Get detailed market depth (order book) for a symbol.",
            symbol_exchange_schema(),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetDepthTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: QuoteParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        self.client.depth(params).await.into()
    }
}

/// Get historical price data
pub struct GetHistoryTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetHistoryTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_history",
            "Get historical price data for a symbol over a date range.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string"},
                    "exchange": {"type": "string"},
                    "interval": {"type": "string", "description": "Candle interval (see get_intervals)"},
                    "start_date": {"type": "string", "description": "YYYY-MM-DD"},
                    "end_date": {"type": "string", "description": "YYYY-MM-DD"}
                },
                "required": ["symbol", "exchange", "interval", "start_date", "end_date"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetHistoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: HistoryParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        self.client.history(params).await.into()
    }
}

/// Get available intervals for historical data
pub struct GetIntervalsTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetIntervalsTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_intervals",
            "Get the candle intervals available for historical data.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetIntervalsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.intervals().await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algodesk_broker::OpenAlgoConfig;

    fn client() -> Arc<OpenAlgoClient> {
        Arc::new(OpenAlgoClient::new(OpenAlgoConfig::new("test-key")))
    }

    #[tokio::test]
    async fn test_quote_requires_symbol() {
        let tool = GetQuoteTool::new(client());
        assert!(tool.execute(json!({})).await.is_failure());
    }

    #[tokio::test]
    async fn test_history_requires_range() {
        let tool = GetHistoryTool::new(client());
        let outcome = tool
            .execute(json!({"symbol": "SBIN", "exchange": "NSE", "interval": "D"}))
            .await;
        assert!(outcome.is_failure());
    }
}
