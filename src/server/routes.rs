//! HTTP routes: health check and gateway status probe

use crate::protocol::{ConnectionStatus, StatusResponse};
use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mcp_server": state.mcp.endpoint(),
    }))
}

/// `GET /api/status` — probe the gateway by refreshing the tool catalogue
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let mcp_server = state.mcp.endpoint();

    if !state.mcp.is_connected() {
        return Json(StatusResponse {
            status: ConnectionStatus::Disconnected,
            mcp_server,
            message: None,
        });
    }

    match state.mcp.refresh_tools().await {
        Ok(_) => Json(StatusResponse {
            status: ConnectionStatus::Connected,
            mcp_server,
            message: None,
        }),
        Err(e) => {
            warn!(error = %e, "Gateway status probe failed");
            Json(StatusResponse {
                status: ConnectionStatus::Error,
                mcp_server,
                message: Some(e.to_string()),
            })
        }
    }
}
