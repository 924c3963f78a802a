//! Terminal chat client
//!
//! Holds one duplex channel to the relay, feeds incoming chunks through the
//! [`Reconciler`], and prints the growing bubble to the terminal. Unexpected
//! channel closures reconnect with exponential backoff; a quit typed by the
//! user closes the channel normally and never reconnects.

use crate::chat::backoff::ReconnectPolicy;
use crate::chat::reconcile::{Reconciler, RenderEvent};
use crate::protocol::{StreamChunk, UserMessage};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use futures_util::{SinkExt, StreamExt};
use std::io::Write as _;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Chat client configuration
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// Relay WebSocket base URL (e.g. `ws://localhost:8000`)
    pub url: String,
    /// Session identifier for this terminal
    pub client_id: String,
}

impl ChatClientConfig {
    /// Build from `CHAT_RELAY_URL` with an optional CLI override
    #[must_use]
    pub fn from_env(url_override: Option<String>) -> Self {
        let url = url_override
            .or_else(|| std::env::var("CHAT_RELAY_URL").ok())
            .unwrap_or_else(|| "ws://localhost:8000".to_string());
        Self {
            url,
            client_id: Uuid::new_v4().to_string(),
        }
    }

    /// Full channel endpoint for this session
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/ws/{}", self.url.trim_end_matches('/'), self.client_id)
    }
}

/// Run the terminal chat loop until the user quits or reconnection is
/// exhausted.
pub async fn run(config: ChatClientConfig) -> Result<()> {
    println!(
        "{}",
        "OpenAlgo Trading Assistant — type a message, or 'quit' to exit.".cyan()
    );

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(line).is_err() {
                break;
            }
        }
    });

    let policy = ReconnectPolicy::default();
    let mut reconciler = Reconciler::new();
    let mut attempt: u32 = 0;
    // The one message that was in flight when the channel dropped; retried
    // once connectivity returns
    let mut pending: Option<String> = None;

    'session: loop {
        let endpoint = config.endpoint();
        let stream = match connect_async(&endpoint).await {
            Ok((stream, _)) => {
                attempt = 0;
                println!("{}", format!("Connected to {endpoint}").dimmed());
                stream
            }
            Err(e) => {
                eprintln!("{}", format!("Connection failed: {e}").red());
                let Some(delay) = policy.delay(attempt) else {
                    bail!("could not reach the relay after {} attempts", policy.max_attempts);
                };
                attempt += 1;
                eprintln!("{}", format!("Retrying in {}s...", delay.as_secs()).dimmed());
                tokio::time::sleep(delay).await;
                continue 'session;
            }
        };
        let (mut write, mut read) = stream.split();

        if let Some(text) = pending.take() {
            let payload = serde_json::to_string(&UserMessage::new(&text))
                .context("failed to encode queued message")?;
            if write.send(Message::Text(payload)).await.is_err() {
                pending = Some(text);
            }
        }

        loop {
            tokio::select! {
                input = input_rx.recv() => {
                    let Some(line) = input else {
                        // stdin closed: treat as a clean quit
                        let _ = write.send(Message::Close(Some(normal_close()))).await;
                        break 'session;
                    };
                    let text = line.trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
                        // User-initiated close: never reconnect
                        let _ = write.send(Message::Close(Some(normal_close()))).await;
                        println!("{}", "Goodbye!".cyan());
                        break 'session;
                    }

                    reconciler.on_user_send(&text);
                    println!("{} {text}", "You:".blue().bold());

                    let payload = serde_json::to_string(&UserMessage::new(&text))
                        .context("failed to encode message")?;
                    if write.send(Message::Text(payload)).await.is_err() {
                        pending = Some(text);
                        break;
                    }
                }
                message = read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<StreamChunk>(&text) {
                                Ok(chunk) => render(&mut reconciler, &chunk),
                                Err(e) => {
                                    eprintln!("{}", format!("Unreadable message from relay: {e}").red());
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            eprintln!("{}", format!("Channel error: {e}").red());
                            break;
                        }
                    }
                }
            }
        }

        // Unexpected closure: visible status change, then backoff
        eprintln!("{}", "Connection to the relay was lost.".yellow());
        let Some(delay) = policy.delay(attempt) else {
            bail!("connection lost and reconnect attempts exhausted");
        };
        attempt += 1;
        eprintln!("{}", format!("Reconnecting in {}s...", delay.as_secs()).dimmed());
        tokio::time::sleep(delay).await;
    }

    Ok(())
}

fn normal_close() -> CloseFrame<'static> {
    CloseFrame {
        code: CloseCode::Normal,
        reason: "client quit".into(),
    }
}

fn render(reconciler: &mut Reconciler, chunk: &StreamChunk) {
    match reconciler.on_chunk(chunk) {
        Some(RenderEvent::Notification(text)) => {
            println!("{}", text.dimmed().italic());
        }
        Some(RenderEvent::Fragment { text, opened, .. }) => {
            if opened {
                print!("{} ", "Assistant:".magenta().bold());
            }
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        Some(RenderEvent::Closed { raw, rendered }) => {
            println!();
            if rendered != raw {
                // The streamed text needed table repair; show the clean form
                println!("{rendered}");
            }
            println!();
        }
        Some(RenderEvent::Complete { rendered, .. }) => {
            println!("{} {rendered}\n", "Assistant:".magenta().bold());
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_session() {
        let config = ChatClientConfig {
            url: "ws://localhost:8000/".to_string(),
            client_id: "tab-1".to_string(),
        };
        assert_eq!(config.endpoint(), "ws://localhost:8000/ws/tab-1");
    }

    #[test]
    fn test_from_env_generates_session_ids() {
        let a = ChatClientConfig::from_env(Some("ws://x".to_string()));
        let b = ChatClientConfig::from_env(Some("ws://x".to_string()));
        assert_ne!(a.client_id, b.client_id);
    }
}
