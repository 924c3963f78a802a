//! Algodesk Broker - OpenAlgo REST API client
//!
//! One typed method per OpenAlgo v1 endpoint, a normalized response shape
//! that always carries a `status` field, and pure helpers for the platform's
//! instrument symbol conventions.
//!
//! Every call is stateless and independently authenticated with the shared
//! API key; the crate performs no retries, caching, or idempotency control.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod outcome;
pub mod symbols;
pub mod types;

pub use client::{OpenAlgoClient, OpenAlgoConfig};
pub use error::{BrokerError, Result};
pub use outcome::ToolOutcome;
pub use types::{
    BasketLeg, HistoryParams, ModifyOrderParams, OpenPositionParams, PlaceOrderParams,
    QuoteParams, SmartOrderParams, SplitOrderParams,
};
