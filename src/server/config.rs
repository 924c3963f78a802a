//! Relay configuration

use anyhow::{bail, Result};

/// How the relay reaches the tool gateway
#[derive(Debug, Clone)]
pub enum McpTarget {
    /// HTTP SSE event stream at a base URL
    Sse {
        /// Gateway base URL (e.g. `http://localhost:8001`)
        url: String,
    },
    /// Spawn the gateway as a child process over stdio
    Stdio {
        /// Command to run
        command: String,
        /// Command arguments
        args: Vec<String>,
    },
}

impl McpTarget {
    /// Endpoint description shown in status responses before a client exists
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Sse { url } => format!("{url}/sse"),
            Self::Stdio { command, .. } => format!("stdio:{command}"),
        }
    }
}

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Gateway target
    pub mcp: McpTarget,
}

impl RelayConfig {
    /// Load configuration from the environment.
    ///
    /// `RELAY_HOST` / `RELAY_PORT` control the listen address;
    /// `MCP_TRANSPORT` selects `sse` (default, with `MCP_HOST`/`MCP_PORT`)
    /// or `stdio` (with `GATEWAY_COMMAND`).
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("RELAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("RELAY_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let transport =
            std::env::var("MCP_TRANSPORT").unwrap_or_else(|_| "sse".to_string());
        let mcp = match transport.to_lowercase().as_str() {
            "sse" => {
                let mcp_host =
                    std::env::var("MCP_HOST").unwrap_or_else(|_| "localhost".to_string());
                let mcp_port = std::env::var("MCP_PORT")
                    .unwrap_or_else(|_| "8001".to_string())
                    .parse()
                    .unwrap_or(8001);
                McpTarget::Sse {
                    url: format!("http://{mcp_host}:{mcp_port}"),
                }
            }
            "stdio" => {
                let command = std::env::var("GATEWAY_COMMAND")
                    .unwrap_or_else(|_| "algodesk".to_string());
                let args = std::env::var("GATEWAY_ARGS")
                    .map(|raw| raw.split_whitespace().map(String::from).collect())
                    .unwrap_or_else(|_| {
                        vec![
                            "gateway".to_string(),
                            "--mode".to_string(),
                            "stdio".to_string(),
                        ]
                    });
                McpTarget::Stdio { command, args }
            }
            other => bail!("unknown MCP_TRANSPORT '{other}' (expected 'sse' or 'stdio')"),
        };

        Ok(Self { host, port, mcp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_describe() {
        let sse = McpTarget::Sse {
            url: "http://localhost:8001".to_string(),
        };
        assert_eq!(sse.describe(), "http://localhost:8001/sse");

        let stdio = McpTarget::Stdio {
            command: "algodesk".to_string(),
            args: vec![],
        };
        assert_eq!(stdio.describe(), "stdio:algodesk");
    }
}
