//! SSE client transport
//!
//! Connects `GET {base}/sse` and keeps the event stream open for the life of
//! the transport. The server's first frame is an `endpoint` event naming the
//! per-session message URL; requests are POSTed there and the matching
//! responses arrive as `message` events on the stream.

use crate::client::{complete_pending, PendingMap, Transport, REQUEST_TIMEOUT};
use crate::error::{McpError, McpResult};
use crate::protocol::{RpcRequest, RpcResponse};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// How long to wait for the server to announce the message endpoint
const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(10);

/// One parsed server-sent event
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental SSE frame parser.
///
/// Feed it lines; a blank line flushes the accumulated frame. Unnamed events
/// default to `message` per the SSE spec; comment lines (leading `:`) are
/// dropped.
#[derive(Debug, Default)]
pub(crate) struct FrameParser {
    event: String,
    data: Vec<String>,
}

impl FrameParser {
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if self.data.is_empty() {
                self.event.clear();
                return None;
            }
            let frame = SseFrame {
                event: if self.event.is_empty() {
                    "message".to_string()
                } else {
                    std::mem::take(&mut self.event)
                },
                data: std::mem::take(&mut self.data).join("\n"),
            };
            self.event.clear();
            return Some(frame);
        }

        if line.starts_with(':') {
            return None;
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.event = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        None
    }
}

/// HTTP event-stream transport
pub struct SseTransport {
    http: reqwest::Client,
    base_url: String,
    message_url: String,
    request_id: AtomicU64,
    pending: PendingMap,
    active: Arc<AtomicBool>,
}

impl SseTransport {
    /// Open the event stream and wait for the endpoint announcement.
    pub async fn connect(base_url: &str) -> McpResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();

        info!(url = %format!("{base_url}/sse"), "Connecting to tool server event stream");

        let response = http
            .get(format!("{base_url}/sse"))
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| McpError::Transport(format!("failed to open event stream: {e}")))?;

        if !response.status().is_success() {
            return Err(McpError::Transport(format!(
                "event stream request failed with status {}",
                response.status()
            )));
        }

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let active = Arc::new(AtomicBool::new(true));
        let (endpoint_tx, endpoint_rx) = oneshot::channel::<String>();

        let reader_pending = pending.clone();
        let reader_active = active.clone();

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer = String::new();
            let mut parser = FrameParser::default();
            let mut endpoint_tx = Some(endpoint_tx);

            while let Some(item) = body.next().await {
                let bytes = match item {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "Event stream read error");
                        break;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].to_string();
                    buffer.drain(..=newline);

                    let Some(frame) = parser.push_line(&line) else {
                        continue;
                    };
                    match frame.event.as_str() {
                        "endpoint" => {
                            if let Some(tx) = endpoint_tx.take() {
                                let _ = tx.send(frame.data);
                            }
                        }
                        "message" => match serde_json::from_str::<RpcResponse>(&frame.data) {
                            Ok(response) => complete_pending(&reader_pending, response),
                            Err(e) => {
                                warn!(error = %e, "Failed to parse message event");
                            }
                        },
                        other => debug!(event = %other, "Ignoring event"),
                    }
                }
            }

            reader_active.store(false, Ordering::SeqCst);
            info!("Tool server event stream closed");
        });

        let endpoint = tokio::time::timeout(ENDPOINT_TIMEOUT, endpoint_rx)
            .await
            .map_err(|_| McpError::Timeout)?
            .map_err(|_| McpError::Transport("event stream closed before endpoint".to_string()))?;

        let message_url = if endpoint.starts_with("http") {
            endpoint
        } else {
            format!("{base_url}{endpoint}")
        };
        debug!(message_url = %message_url, "Message endpoint announced");

        Ok(Self {
            http,
            base_url,
            message_url,
            request_id: AtomicU64::new(1),
            pending,
            active,
        })
    }

    async fn post(&self, request: &RpcRequest) -> McpResult<()> {
        let response = self
            .http
            .post(&self.message_url)
            .json(request)
            .send()
            .await
            .map_err(|e| McpError::Transport(format!("failed to post request: {e}")))?;

        if !response.status().is_success() {
            return Err(McpError::Transport(format!(
                "message post failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for SseTransport {
    async fn request(&self, request: RpcRequest) -> McpResult<RpcResponse> {
        let id = request
            .id
            .ok_or_else(|| McpError::Protocol("request requires an id".to_string()))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.insert(id, tx);
        }

        if let Err(e) = self.post(&request).await {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.remove(&id);
            return Err(e);
        }

        let response = tokio::time::timeout(REQUEST_TIMEOUT, rx)
            .await
            .map_err(|_| McpError::Timeout)?
            .map_err(|_| McpError::Transport("response channel closed".to_string()))?;

        if let Some(error) = response.error {
            return Err(McpError::Server {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response)
    }

    async fn notify(&self, request: RpcRequest) -> McpResult<()> {
        self.post(&request).await
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        format!("{}/sse", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_parser_named_event() {
        let mut parser = FrameParser::default();
        assert!(parser.push_line("event: endpoint").is_none());
        assert!(parser.push_line("data: /messages?session_id=abc").is_none());
        let frame = parser.push_line("").unwrap();
        assert_eq!(frame.event, "endpoint");
        assert_eq!(frame.data, "/messages?session_id=abc");
    }

    #[test]
    fn test_frame_parser_default_event_name() {
        let mut parser = FrameParser::default();
        parser.push_line(r#"data: {"jsonrpc":"2.0","id":1,"result":{}}"#);
        let frame = parser.push_line("").unwrap();
        assert_eq!(frame.event, "message");
    }

    #[test]
    fn test_frame_parser_multiline_data() {
        let mut parser = FrameParser::default();
        parser.push_line("data: first");
        parser.push_line("data: second");
        let frame = parser.push_line("").unwrap();
        assert_eq!(frame.data, "first\nsecond");
    }

    #[test]
    fn test_frame_parser_ignores_comments_and_blank_runs() {
        let mut parser = FrameParser::default();
        assert!(parser.push_line(": keepalive").is_none());
        assert!(parser.push_line("").is_none());
        parser.push_line("data: x");
        assert!(parser.push_line("").is_some());
    }

    #[test]
    fn test_frame_parser_strips_carriage_returns() {
        let mut parser = FrameParser::default();
        parser.push_line("data: payload\r");
        let frame = parser.push_line("\r").unwrap();
        assert_eq!(frame.data, "payload");
    }
}
