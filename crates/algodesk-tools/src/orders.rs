//! Order management tools

use crate::registry::{Tool, ToolDefinition};
use crate::{parse_args, ToolOutcome};
use algodesk_broker::{ModifyOrderParams, OpenAlgoClient, PlaceOrderParams};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
struct OrderIdArgs {
    order_id: String,
}

/// Place a new order
pub struct PlaceOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl PlaceOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "place_order",
            "Place a new order. Supports market, limit, and stop-loss orders.",
            json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string", "description": "Trading symbol (e.g. SBIN, RELIANCE)"},
                    "quantity": {"type": "integer", "description": "Order quantity"},
                    "action": {"type": "string", "enum": ["BUY", "SELL"]},
                    "exchange": {"type": "string", "description": "Exchange (NSE, BSE, NFO, ...)", "default": "NSE"},
                    "pricetype": {"type": "string", "enum": ["MARKET", "LIMIT", "SL", "SL-M"], "default": "MARKET"},
                    "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"], "default": "MIS"},
                    "price": {"type": "number", "description": "Order price (required for LIMIT and SL orders)"},
                    "trigger_price": {"type": "number", "description": "Trigger price (required for SL and SL-M orders)"},
                    "disclosed_quantity": {"type": "integer"}
                },
                "required": ["symbol", "quantity", "action"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for PlaceOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: PlaceOrderParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        info!(
            symbol = %params.symbol,
            action = %params.action,
            quantity = params.quantity,
            "Placing order"
        );
        self.client.place_order(params).await.into()
    }
}

/// Modify an existing order
pub struct ModifyOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl ModifyOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "modify_order",
            "Modify an existing order's price, quantity, or other parameters.",
            json!({
                "type": "object",
                "properties": {
                    "orderid": {"type": "string", "description": "Order ID to modify"},
                    "symbol": {"type": "string"},
                    "quantity": {"type": "integer", "description": "New quantity"},
                    "price": {"type": "number", "description": "New price"},
                    "action": {"type": "string", "enum": ["BUY", "SELL"]},
                    "exchange": {"type": "string"},
                    "pricetype": {"type": "string", "enum": ["MARKET", "LIMIT", "SL", "SL-M"]},
                    "product": {"type": "string", "enum": ["MIS", "CNC", "NRML"]},
                    "trigger_price": {"type": "number"}
                },
                "required": ["orderid", "symbol", "quantity", "price"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for ModifyOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let params: ModifyOrderParams = match parse_args(input) {
            Ok(params) => params,
            Err(outcome) => return outcome,
        };
        info!(order_id = %params.order_id, "Modifying order");
        self.client.modify_order(params).await.into()
    }
}

/// Cancel a specific order by ID
pub struct CancelOrderTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl CancelOrderTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "cancel_order",
            "Cancel a specific order by ID.",
            json!({
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order ID to cancel"}
                },
                "required": ["order_id"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for CancelOrderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let args: OrderIdArgs = match parse_args(input) {
            Ok(args) => args,
            Err(outcome) => return outcome,
        };
        info!(order_id = %args.order_id, "Cancelling order");
        self.client.cancel_order(&args.order_id).await.into()
    }
}

/// Cancel all open orders
pub struct CancelAllOrdersTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl CancelAllOrdersTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "cancel_all_orders",
            "Cancel all open orders for the current strategy.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for CancelAllOrdersTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        info!("Cancelling all orders");
        self.client.cancel_all_orders().await.into()
    }
}

/// Get the status of a specific order
pub struct OrderStatusTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl OrderStatusTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_order_status",
            "Get the status of a specific order by ID.",
            json!({
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order ID to look up"}
                },
                "required": ["order_id"]
            }),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for OrderStatusTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let args: OrderIdArgs = match parse_args(input) {
            Ok(args) => args,
            Err(outcome) => return outcome,
        };
        self.client.order_status(&args.order_id).await.into()
    }
}

/// List all orders for the current strategy
pub struct GetOrdersTool {
    client: Arc<OpenAlgoClient>,
    definition: ToolDefinition,
}

impl GetOrdersTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<OpenAlgoClient>) -> Self {
        let definition = ToolDefinition::new(
            "get_orders",
            "List all orders for the current strategy.",
            json!({"type": "object", "properties": {}}),
        );
        Self { client, definition }
    }
}

#[async_trait::async_trait]
impl Tool for GetOrdersTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        self.client.order_book().await.into()
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
    async fn test_place_order_rejects_malformed_arguments() {
        let tool = PlaceOrderTool::new(client());
        let outcome = tool.execute(json!({"symbol": "SBIN"})).await;
        match outcome {
            ToolOutcome::Failure { kind, .. } => assert_eq!(kind, "validation"),
            ToolOutcome::Success(_) => panic!("expected validation failure"),
        }
    }

    #[tokio::test]
    async fn test_cancel_order_requires_order_id() {
        let tool = CancelOrderTool::new(client());
        let outcome = tool.execute(json!({})).await;
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_definitions_have_schemas() {
        let tool = PlaceOrderTool::new(client());
        let def = tool.definition();
        assert_eq!(def.name, "place_order");
        assert_eq!(def.parameters["type"], "object");
        assert!(def.parameters["required"]
            .as_array()
            .unwrap()
            .contains(&json!("symbol")));
    }
}
