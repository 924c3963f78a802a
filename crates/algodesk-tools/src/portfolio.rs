//! Position and portfolio tools

use crate::registry::{Tool, ToolDefinition};
use crate::{parse_args, ToolOutcome};
use algodesk_broker::{OpenAlgoClient, OpenPositionParams};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Get an open position for a specific symbol
pub struct OpenPositionTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl OpenPositionTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_open_position",
            "Get details of an open position for a specific symbol.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string"},
                    "exchange": {"type": "string"},
                    "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"]}
                },
                "required": ["symbol", "exchange", "product"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for OpenPositionTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: OpenPositionParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        self.client.open_position(params).await.into()
    }
}

/// Close all open positions
pub struct CloseAllPositionsTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl CloseAllPositionsTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "close_all_positions",
            "Close all open positions for the current strategy.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for CloseAllPositionsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        info!("Closing all positions");
        self.client.close_all_positions().await.into()
    }
}

/// Get all current positions
pub struct PositionBookTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl PositionBookTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_position_book",
            "Get details of all current positions.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for PositionBookTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.position_book().await.into()
    }
}

/// Get details of all orders
pub struct OrderBookTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl OrderBookTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_order_book",
            "Get details of all orders.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for OrderBookTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.order_book().await.into()
    }
}

/// Get all executed trades
pub struct TradeBookTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl TradeBookTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_trade_book",
            "Get the record of all executed trades.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for TradeBookTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.trade_book().await.into()
    }
}

/// Get portfolio holdings
pub struct HoldingsTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl HoldingsTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_holdings",
            "Get portfolio holdings information.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for HoldingsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.holdings().await.into()
    }
}
