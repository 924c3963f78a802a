//! Algodesk Tools - the trading tool catalogue
//!
//! Each tool is a declarative pass-through: a stable name, a JSON schema
//! mirroring one OpenAlgo REST endpoint's fields, and an `execute` that
//! validates arguments and forwards to the broker client. Failures come
//! back as structured [`ToolOutcome::Failure`] payloads so the calling
//! model can read and react to them; nothing here raises.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod advanced;
pub mod catalog;
pub mod market;
pub mod orders;
pub mod portfolio;
pub mod registry;

pub use algodesk_broker::ToolOutcome;
pub use catalog::register_trading_tools;
pub use registry::{Tool, ToolDefinition, ToolRegistry};

use serde_json::Value;

/// Deserialize tool arguments, mapping malformed input to a validation
/// failure instead of an error the caller would have to catch.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(
    input: Value,
) -> Result<T, ToolOutcome> {
    serde_json::from_value(input).map_err(|e| ToolOutcome::Failure {
        kind: "validation".to_string(),
        message: format!("invalid arguments: {e}"),
    })
}
