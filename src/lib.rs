//! Algodesk - trading-desk assistant for OpenAlgo
//!
//! Three cooperating processes built from one binary:
//!
//! - `algodesk gateway` — publishes the OpenAlgo trading API as a tool
//!   catalogue over a stdio pipe or an HTTP SSE event stream
//! - `algodesk serve` — the assistant relay: WebSocket chat server that
//!   wires an LLM to the gateway's tools and streams answers token-by-token
//! - `algodesk chat` — terminal client reconstructing the streamed
//!   fragments into chat bubbles

#![forbid(unsafe_code)]

pub mod chat;
pub mod cli;
pub mod gateway;
pub mod protocol;
pub mod server;
