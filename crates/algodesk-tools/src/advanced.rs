//! Advanced order tools: basket, split, and smart orders
//!
//! These pass the platform's own batching endpoints through verbatim; the
//! splitting/sizing logic lives on the platform side.

use crate::registry::{Tool, ToolDefinition};
use crate::{parse_args, ToolOutcome};
use algodesk_broker::{BasketLeg, OpenAlgoClient, SmartOrderParams, SplitOrderParams};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
struct BasketArgs {
    orders: Vec<BasketLeg>,
}

/// Place multiple orders at once
pub struct BasketOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl BasketOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "place_basket_order",
            "Place multiple orders simultaneously using the basket endpoint.",
            json!({
                "type": "object",
                "properties": {
                    "orders": {
                        "type": "array",
                        "description": "Orders to place",
                        "items": {
                            "type": "object",
                            "properties": {
                                "symbol": {"type": "string"},
                                "exchange": {"type": "string"},
                                "action": {"type": "string", "enum": ["BUY", "SELL"]},
                                "quantity": {"type": "integer"},
                                "pricetype": {"type": "string", "enum": ["MARKET", "LIMIT", "SL", "SL-M"], "default": "MARKET"},
                                "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"], "default": "MIS"}
                            },
                            "required": ["symbol", "exchange", "action", "quantity"]
                        }
                    }
                },
                "required": ["orders"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for BasketOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let args: BasketArgs = match parse_args(input) {
            Ok(args) => args,
            Err(outcome) => return outcome,
        };
        info!(legs = args.orders.len(), "Placing basket order");
        self.client.basket_order(args.orders).await.into()
    }
}

/// Split a large order into smaller chunks
pub struct SplitOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl SplitOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "place_split_order",
            "Split a large order into multiple smaller orders to reduce market impact.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string"},
                    "exchange": {"type": "string"},
                    "action": {"type": "string", "enum": ["BUY", "SELL"]},
                    "quantity": {"type": "integer", "description": "Total order quantity"},
                    "splitsize": {"type": "integer", "description": "Size of each split order"},
                    "pricetype": {"type": "string", "enum": ["MARKET", "LIMIT", "SL", "SL-M"], "default": "MARKET"},
                    "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"], "default": "MIS"},
                    "price": {"type": "number", "description": "Order price (LIMIT orders)"},
                    "trigger_price": {"type": "number", "description": "Trigger price (SL orders)"}
                },
                "required": ["symbol", "exchange", "action", "quantity", "splitsize"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for SplitOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: SplitOrderParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        info!(
            symbol = %params.symbol,
            quantity = params.quantity,
            split_size = params.split_size,
            "Placing split order"
        );
        self.client.split_order(params).await.into()
    }
}

/// Place an order that accounts for the current position size
pub struct SmartOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl SmartOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "place_smart_order",
            "Place a smart order that considers the current position size.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string"},
                    "action": {"type": "string", "enum": ["BUY", "SELL"]},
                    "quantity": {"type": "integer"},
                    "position_size": {"type": "integer", "description": "Current position size"},
                    "exchange": {"type": "string", "default": "NSE"},
                    "pricetype": {"type": "string", "enum": ["MARKET", "LIMIT", "SL", "SL-M"], "default": "MARKET"},
                    "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"], "default": "MIS"}
                },
                "required": ["symbol", "action", "quantity", "position_size"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for SmartOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: SmartOrderParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        info!(
            symbol = %params.symbol,
            position_size = params.position_size,
            "Placing smart order"
        );
        self.client.smart_order(params).await.into()
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
    async fn test_basket_requires_orders_field() {
        let tool = BasketOrderTool::new(client());
        assert!(tool.execute(json!({})).await.is_failure());
    }

    #[tokio::test]
    async fn test_smart_order_requires_position_size() {
        let tool = SmartOrderTool::new(client());
        let outcome = tool
            .execute(json!({"symbol": "SBIN", "action": "BUY", "quantity": 1}))
            .await;
        assert!(outcome.is_failure());
    }
}
