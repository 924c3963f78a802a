//! Error types for algodesk-broker

use thiserror::Error;

/// Broker error type
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Transport-level failure (connection, timeout, TLS)
    #[error("http error: {0}")]
    Http(String),

    /// The platform rejected the request
    #[error("platform error ({status}): {message}")]
    Api {
        /// HTTP status code reported by the platform
        status: u16,
        /// Human-readable message from the platform
        message: String,
    },

    /// Response body was not the expected JSON shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Input failed validation before any request was made
    #[error("validation error: {0}")]
    Validation(String),
}

impl BrokerError {
    /// Stable machine-readable kind for the structured error payload
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Validation(_) => "validation",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrokerError>;
