//! Gateway configuration

use algodesk_broker::{OpenAlgoClient, OpenAlgoConfig};
use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Gateway transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    /// Newline-delimited JSON-RPC over the process pipe
    Stdio,
    /// HTTP server with an SSE event stream
    Sse,
}

impl FromStr for GatewayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            other => Err(format!("unknown mode '{other}' (expected 'stdio' or 'sse')")),
        }
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse => write!(f, "sse"),
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OpenAlgo API key
    pub api_key: String,
    /// OpenAlgo API host
    pub api_host: String,
    /// Listen port (SSE mode)
    pub port: u16,
    /// Transport mode
    pub mode: GatewayMode,
}

impl GatewayConfig {
    /// Load configuration from the environment, with an optional API key
    /// override from the command line.
    ///
    /// A missing API key is a startup-time fatal condition.
    pub fn from_env(api_key_override: Option<String>) -> Result<Self> {
        let api_key = match api_key_override.or_else(|| std::env::var("OPENALGO_API_KEY").ok())
        {
            Some(key) if !key.is_empty() => key,
            _ => bail!("OPENALGO_API_KEY must be set in the environment or via --api-key"),
        };

        let api_host = std::env::var("OPENALGO_API_HOST")
            .unwrap_or_else(|_| algodesk_broker::client::DEFAULT_HOST.to_string());
        let port = std::env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .unwrap_or(8001);
        let mode = std::env::var("GATEWAY_MODE")
            .unwrap_or_else(|_| "sse".to_string())
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(Self {
            api_key,
            api_host,
            port,
            mode,
        })
    }

    /// Build the broker client for this configuration
    #[must_use]
    pub fn broker_client(&self) -> OpenAlgoClient {
        OpenAlgoClient::new(OpenAlgoConfig::new(&self.api_key).with_host(&self.api_host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("stdio".parse::<GatewayMode>().unwrap(), GatewayMode::Stdio);
        assert_eq!("SSE".parse::<GatewayMode>().unwrap(), GatewayMode::Sse);
        assert!("http".parse::<GatewayMode>().is_err());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        std::env::remove_var("OPENALGO_API_KEY");
        assert!(GatewayConfig::from_env(None).is_err());
        assert!(GatewayConfig::from_env(Some(String::new())).is_err());
    }

    #[test]
    fn test_cli_key_override() {
        let config = GatewayConfig::from_env(Some("cli-key".to_string())).unwrap();
        assert_eq!(config.api_key, "cli-key");
    }
}
