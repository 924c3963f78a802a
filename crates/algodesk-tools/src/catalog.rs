//! Catalogue assembly

use crate::account::{AllTickersTool, GetFundsTool, SymbolMetadataTool};
use crate::advanced::{BasketOrderTool, SmartOrderTool, SplitOrderTool};
use crate::market::{GetDepthTool, GetHistoryTool, GetIntervalsTool, GetQuoteTool};
use crate::orders::{
    CancelAllOrdersTool, CancelOrderTool, GetOrdersTool, ModifyOrderTool, OrderStatusTool,
    PlaceOrderTool,
};
use crate::portfolio::{
    CloseAllPositionsTool, HoldingsTool, OpenPositionTool, OrderBookTool, PositionBookTool,
    TradeBookTool,
};
use crate::registry::ToolRegistry;
use algodesk_broker::OpenAlgoClient;
use std::sync::Arc;
use tracing::info;

/// Register the full trading catalogue against one broker client.
pub fn register_trading_tools(registry: &mut ToolRegistry, client: Arc<OpenAlgoClient>) {
    registry.register(Arc::new(PlaceOrderTool::new(client.clone())));
    registry.register(Arc::new(ModifyOrderTool::new(client.clone())));
    registry.register(Arc::new(CancelOrderTool::new(client.clone())));
    registry.register(Arc::new(CancelAllOrdersTool::new(client.clone())));
    registry.register(Arc::new(OrderStatusTool::new(client.clone())));
    registry.register(Arc::new(GetOrdersTool::new(client.clone())));

    registry.register(Arc::new(BasketOrderTool::new(client.clone())));
    registry.register(Arc::new(SplitOrderTool::new(client.clone())));
    registry.register(Arc::new(SmartOrderTool::new(client.clone())));

    registry.register(Arc::new(GetQuoteTool::new(client.clone())));
    registry.register(Arc::new(GetDepthTool::new(client.clone())));
    registry.register(Arc::new(GetHistoryTool::new(client.clone())));
    registry.register(Arc::new(GetIntervalsTool::new(client.clone())));

    registry.register(Arc::new(OpenPositionTool::new(client.clone())));
    registry.register(Arc::new(CloseAllPositionsTool::new(client.clone())));
    registry.register(Arc::new(PositionBookTool::new(client.clone())));
    registry.register(Arc::new(OrderBookTool::new(client.clone())));
    registry.register(Arc::new(TradeBookTool::new(client.clone())));
    registry.register(Arc::new(HoldingsTool::new(client.clone())));

    registry.register(Arc::new(GetFundsTool::new(client.clone())));
    registry.register(Arc::new(AllTickersTool::new(client.clone())));
    registry.register(Arc::new(SymbolMetadataTool::new(client)));

    info!(tools = registry.len(), "Trading tool catalogue registered");
}
