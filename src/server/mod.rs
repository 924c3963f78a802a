//! Assistant relay server
//!
//! axum HTTP/WebSocket server wiring the LLM provider to the tool gateway.
//! Sessions are independent; the only shared resources are the provider and
//! the gateway connection, both stateless per call.

pub mod config;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod turn;
pub mod websocket;

use algodesk_llm::{provider_from_env, LlmProvider};
use algodesk_mcp::McpClient;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use config::{McpTarget, RelayConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// The configured LLM provider
    pub provider: Arc<dyn LlmProvider>,
    /// Connection to the tool gateway
    pub mcp: Arc<McpClient>,
}

/// Start the relay and serve until the process is terminated
pub async fn start(config: RelayConfig) -> Result<()> {
    let provider = provider_from_env().context("LLM provider configuration")?;

    let mcp = match &config.mcp {
        McpTarget::Sse { url } => McpClient::connect_sse(url).await,
        McpTarget::Stdio { command, args } => McpClient::connect_stdio(command, args).await,
    }
    .with_context(|| format!("failed to connect to tool gateway ({})", config.mcp.describe()))?;

    info!(
        endpoint = %mcp.endpoint(),
        tools = mcp.list_tools().len(),
        "Connected to tool gateway"
    );

    let state = AppState {
        provider,
        mcp: Arc::new(mcp),
    };

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/status", get(routes::api_status))
        .route("/ws/:client_id", get(websocket::chat_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid relay listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind relay address")?;

    info!("Assistant relay listening on http://{addr}");
    axum::serve(listener, app).await.context("relay server exited")
}
