//! Command-line interface

use crate::chat::client::ChatClientConfig;
use crate::gateway::config::{GatewayConfig, GatewayMode};
use crate::server::config::RelayConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};

/// Trading-desk assistant for OpenAlgo
#[derive(Debug, Parser)]
#[command(name = "algodesk", version, about)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the assistant relay (WebSocket chat server)
    Serve {
        /// Listen host (overrides RELAY_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides RELAY_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the tool gateway
    Gateway {
        /// Transport mode: stdio or sse (overrides GATEWAY_MODE)
        #[arg(long)]
        mode: Option<GatewayMode>,
        /// Listen port for SSE mode (overrides GATEWAY_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// OpenAlgo API key (overrides OPENALGO_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// OpenAlgo API host (overrides OPENALGO_API_HOST)
        #[arg(long)]
        api_host: Option<String>,
    },
    /// Start the terminal chat client
    Chat {
        /// Relay WebSocket base URL (e.g. ws://localhost:8000)
        #[arg(long)]
        url: Option<String>,
    },
}

impl Cli {
    /// Default tracing filter for the selected subcommand.
    ///
    /// The chat client keeps logging quiet so the prompt stays readable.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Command::Chat { .. } => "algodesk=warn",
            _ => "algodesk=info,tower_http=info",
        }
    }
}

/// Dispatch the parsed command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port } => {
            let mut config = RelayConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            crate::server::start(config).await
        }
        Command::Gateway {
            mode,
            port,
            api_key,
            api_host,
        } => {
            let mut config = GatewayConfig::from_env(api_key)?;
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(api_host) = api_host {
                config.api_host = api_host;
            }
            crate::gateway::start(config).await
        }
        Command::Chat { url } => {
            let config = ChatClientConfig::from_env(url);
            crate::chat::client::run(config).await
        }
    }
}
