//! Algodesk LLM - provider abstraction for the assistant relay
//!
//! This crate wraps the hosted model providers the relay can talk to:
//! - OpenAI (via async-openai)
//! - Groq (OpenAI-compatible API via reqwest)
//!
//! Both expose the same [`LlmProvider`] trait: a single streaming
//! chat-completion call that carries the tool catalogue and yields text
//! fragments and tool-call requests as they arrive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod groq;
pub mod message;
pub mod openai;
pub mod provider;
pub mod stream;
pub mod tools;

pub use completion::{CompletionRequest, ToolCompletionRequest};
pub use error::{Error, Result};
pub use groq::{GroqConfig, GroqProvider};
pub use message::{Message, MessageRole};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{provider_from_env, LlmProvider, ProviderKind};
pub use stream::{CompletionStream, StreamDelta, ToolCallAccumulator, TurnFinish};
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
