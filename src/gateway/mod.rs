//! Tool gateway
//!
//! Builds the trading tool catalogue over one broker client and serves it
//! over the selected transport. The gateway holds no session state: every
//! tool invocation is an independent, individually authenticated REST call.

pub mod config;
pub mod service;
pub mod sse;
pub mod stdio;

use anyhow::Result;
use algodesk_tools::{register_trading_tools, ToolRegistry};
use config::{GatewayConfig, GatewayMode};
use service::TradingToolService;
use std::sync::Arc;
use tracing::info;

/// Start the gateway in the configured mode
pub async fn start(config: GatewayConfig) -> Result<()> {
    info!(
        api_host = %config.api_host,
        mode = %config.mode,
        "Starting tool gateway"
    );

    let client = Arc::new(config.broker_client());
    let mut registry = ToolRegistry::new();
    register_trading_tools(&mut registry, client);
    let service = TradingToolService::new(registry);

    match config.mode {
        GatewayMode::Stdio => stdio::serve(&service).await,
        GatewayMode::Sse => sse::serve(Arc::new(service), config.port).await,
    }
}
