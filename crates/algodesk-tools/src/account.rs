//! Account and symbol metadata tools

use crate::registry::{Tool, ToolDefinition};
use crate::{parse_args, ToolOutcome};
use algodesk_broker::{OpenAlgoClient, QuoteParams};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Get available funds and margin information
pub struct GetFundsTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetFundsTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_funds",
            "Get available funds and margin information.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetFundsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.funds().await.into()
    }
}

/// Get metadata for a trading symbol
pub struct SymbolMetadataTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl SymbolMetadataTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_symbol_metadata",
            "Get detailed information about a trading symbol.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string"},
                    "exchange": {"type": "string"}
                },
                "required": ["symbol", "exchange"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for SymbolMetadataTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: QuoteParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        self.client.symbol_metadata(params).await.into()
    }
}

#[derive(Deserialize)]
struct TickersArgs {
    #[serde(default)]
    exchange: Option<String>,
}

/// List all available tickers
pub struct AllTickersTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl AllTickersTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_all_tickers",
            "Get all available tickers/symbols, optionally filtered by exchange.",
            json!({
                "type": "object",
                "properties": {
                    "exchange": {"type": "string", "description": "Optional exchange filter (NSE, BSE, ...)"}
                }
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for AllTickersTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let args: TickersArgs = match parse_args(input) {
            Ok(args) => args,
            Err(outcome) => return outcome,
        };
        self.client.tickers(args.exchange.as_deref()).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algodesk_broker::OpenAlgoConfig;

    #[tokio::test]
    async fn test_symbol_metadata_requires_exchange() {
        let client = Arc::new(OpenAlgoClient::new(OpenAlgoConfig::new("test-key")));
        let tool = SymbolMetadataTool::new(client);
        assert!(tool.execute(json!({"symbol": "SBIN"})).await.is_failure());
    }
}
