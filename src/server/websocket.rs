//! Chat WebSocket handler
//!
//! One WebSocket connection is one session. Turns are processed strictly
//! one at a time per connection, so no fragment of turn N+1 can be emitted
//! before the terminating chunk of turn N.

use crate::protocol::{Role, StreamChunk, UserMessage};
use crate::server::prompt::WELCOME;
use crate::server::session::Session;
use crate::server::turn::{GatewayExecutor, TurnEngine};
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// WebSocket upgrade handler
pub async fn chat_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

/// Drive one chat connection until it closes
async fn handle_socket(socket: WebSocket, client_id: String, state: AppState) {
    info!(session = %client_id, "Chat channel connected");

    let (mut sender, mut receiver) = socket.split();

    // Outbound chunks funnel through one channel so emission order is
    // exactly send order
    let (tx, mut rx) = mpsc::unbounded_channel::<StreamChunk>();
    let forward = tokio::spawn(async move {
        while let Some(chunk) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&chunk) else {
                continue;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(StreamChunk::complete(WELCOME));

    let mut session = Session::new(client_id.clone());
    let executor = Arc::new(GatewayExecutor::new(state.mcp.clone()));
    let engine = TurnEngine::new(state.provider.clone(), executor);

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<UserMessage>(&text) {
                Ok(user) if user.role == Role::User => {
                    let content = user.content.trim().to_string();
                    if content.is_empty() {
                        continue;
                    }
                    // Turns run inline: the next message is not read until
                    // this turn's terminating chunk has been queued
                    engine.run_turn(&mut session, &content, &tx).await;
                }
                Ok(_) => {
                    let _ = tx.send(StreamChunk::system(
                        "Error: only user messages are accepted on this channel.",
                    ));
                }
                Err(e) => {
                    warn!(session = %session.id, error = %e, "Invalid message from client");
                    let _ = tx.send(StreamChunk::system("Error: Invalid message format."));
                }
            },
            Ok(Message::Close(_)) => {
                info!(session = %session.id, "Client closed the channel");
                break;
            }
            Ok(_) => {} // Ping/Pong are answered by the transport
            Err(e) => {
                error!(session = %session.id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    forward.abort();
    info!(
        session = %session.id,
        transcript_len = session.transcript().len(),
        "Chat channel closed"
    );
    // Session state is dropped with the connection; nothing is persisted
}
