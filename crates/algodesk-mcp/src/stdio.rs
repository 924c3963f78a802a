//! Stdio client transport
//!
//! Spawns the tool server as a child process and speaks newline-delimited
//! JSON-RPC over its pipes. A dedicated reader thread parses stdout lines
//! and completes pending requests by id.

use crate::client::{complete_pending, PendingMap, Transport, REQUEST_TIMEOUT};
use crate::error::{McpError, McpResult};
use crate::protocol::{RpcRequest, RpcResponse};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Child-process stdio transport
pub struct StdioTransport {
    command: String,
    request_id: AtomicU64,
    pending: PendingMap,
    process: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    active: Arc<AtomicBool>,
}

impl StdioTransport {
    /// Spawn the server process and start the stdout reader thread.
    pub fn spawn(command: &str, args: &[String]) -> McpResult<Self> {
        info!(command = %command, args = ?args, "Spawning tool server process");

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| McpError::Transport(format!("failed to spawn tool server: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Transport("failed to get stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Transport("failed to get stdout handle".to_string()))?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let active = Arc::new(AtomicBool::new(true));

        let reader_pending = pending.clone();
        let reader_active = active.clone();
        let reader_command = command.to_string();

        std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) if !line.is_empty() => {
                        debug!(server = %reader_command, line = %line, "Received from tool server");
                        match serde_json::from_str::<RpcResponse>(&line) {
                            Ok(response) => complete_pending(&reader_pending, response),
                            Err(e) => {
                                warn!(server = %reader_command, error = %e, "Failed to parse response");
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(server = %reader_command, error = %e, "Read error");
                        break;
                    }
                }
            }
            reader_active.store(false, Ordering::SeqCst);
            info!(server = %reader_command, "Tool server reader thread exited");
        });

        Ok(Self {
            command: command.to_string(),
            request_id: AtomicU64::new(1),
            pending,
            process: Mutex::new(child),
            stdin: Mutex::new(stdin),
            active,
        })
    }

    fn write_line(&self, request: &RpcRequest) -> McpResult<()> {
        let json = serde_json::to_string(request)
            .map_err(|e| McpError::Protocol(format!("failed to serialize request: {e}")))?;
        debug!(server = %self.command, request = %json, "Sending to tool server");

        let mut stdin = self.stdin.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(stdin, "{json}")
            .map_err(|e| McpError::Transport(format!("failed to write to stdin: {e}")))?;
        stdin
            .flush()
            .map_err(|e| McpError::Transport(format!("failed to flush stdin: {e}")))
    }
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn request(&self, request: RpcRequest) -> McpResult<RpcResponse> {
        let id = request
            .id
            .ok_or_else(|| McpError::Protocol("request requires an id".to_string()))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.insert(id, tx);
        }

        if let Err(e) = self.write_line(&request) {
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
        self.write_line(&request)
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        format!("stdio:{}", self.command)
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        let mut process = self.process.lock().unwrap_or_else(|e| e.into_inner());
        let _ = process.kill();
        self.active.store(false, Ordering::SeqCst);
        info!(server = %self.command, "Tool server process stopped");
    }
}
