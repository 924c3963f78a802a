//! SSE server frontend
//!
//! `GET /sse` opens a per-session event stream. The first event is an
//! `endpoint` frame naming the session's message URL; clients POST JSON-RPC
//! requests there and the responses are pushed back over the stream as
//! `message` events. Sessions evaporate when the stream drops.

use algodesk_mcp::{dispatch, RpcRequest, ToolService};
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

type SessionMap = Arc<Mutex<HashMap<Uuid, mpsc::UnboundedSender<Event>>>>;

/// Shared SSE server state
#[derive(Clone)]
struct SseState {
    service: Arc<dyn ToolService>,
    sessions: SessionMap,
}

/// Serve the tool service over HTTP/SSE until the process is terminated
pub async fn serve(service: Arc<dyn ToolService>, port: u16) -> Result<()> {
    let state = SseState {
        service,
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };

    let app = Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(message_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind gateway address")?;

    info!("Tool gateway serving SSE on http://{addr}");
    axum::serve(listener, app)
        .await
        .context("gateway server exited")
}

/// Removes the session from the map when its stream drops
struct SessionGuard {
    id: Uuid,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
        info!(session = %self.id, "SSE session closed");
    }
}

async fn sse_handler(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(session_id, tx);
    info!(session = %session_id, "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?session_id={session_id}"));
    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };

    let stream = futures::stream::once(async move { Ok::<Event, Infallible>(endpoint) }).chain(
        futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|event| (Ok(event), (rx, guard)))
        }),
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Deserialize)]
struct MessageQuery {
    session_id: Uuid,
}

async fn message_handler(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<RpcRequest>,
) -> impl IntoResponse {
    let sender = state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&query.session_id)
        .cloned();

    let Some(sender) = sender else {
        warn!(session = %query.session_id, "Message for unknown SSE session");
        return StatusCode::NOT_FOUND;
    };

    if let Some(response) = dispatch(state.service.as_ref(), request).await {
        match serde_json::to_string(&response) {
            Ok(json) => {
                // A send failure means the stream dropped mid-dispatch; the
                // guard has already cleaned the session up
                let _ = sender.send(Event::default().event("message").data(json));
            }
            Err(e) => error!(error = %e, "Failed to serialize response"),
        }
    }

    StatusCode::ACCEPTED
}
