//! Stdio server frontend
//!
//! Newline-delimited JSON-RPC over the process pipe: one request per stdin
//! line, one response per stdout line. Notifications produce no output.
//! Exits when stdin closes.

use algodesk_mcp::{dispatch, RpcRequest, ToolService};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// Serve the tool service over stdin/stdout until EOF
pub async fn serve(service: &dyn ToolService) -> Result<()> {
    info!("Tool gateway serving on stdio");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                // Without an id there is nothing to address a reply to
                warn!(error = %e, "Dropping unparseable request line");
                continue;
            }
        };

        if let Some(response) = dispatch(service, request).await {
            let json =
                serde_json::to_string(&response).context("failed to serialize response")?;
            stdout
                .write_all(json.as_bytes())
                .await
                .context("stdout write failed")?;
            stdout.write_all(b"\n").await.context("stdout write failed")?;
            stdout.flush().await.context("stdout flush failed")?;
        }
    }

    info!("stdin closed, tool gateway shutting down");
    Ok(())
}
