//! Streaming completion types
//!
//! Providers deliver a turn as an ordered stream of [`StreamDelta`] items:
//! zero or more `Content` fragments followed by exactly one `Finish` carrying
//! any tool calls the model issued. Fragment order is the provider's emission
//! order and must be preserved by consumers.

use crate::error::Result;
use crate::tools::ToolCall;
use futures::Stream;
use std::pin::Pin;

/// One item of a streamed completion
#[derive(Debug, Clone)]
pub enum StreamDelta {
    /// Incremental fragment of the assistant's textual answer
    Content(String),
    /// Terminal item, emitted once when the provider closes the turn
    Finish(TurnFinish),
}

/// How a streamed turn ended
#[derive(Debug, Clone, Default)]
pub struct TurnFinish {
    /// Tool calls the model requested (empty for a plain text answer)
    pub tool_calls: Vec<ToolCall>,
    /// Terminal content for providers that return the answer in one piece
    /// instead of streaming fragments
    pub content: Option<String>,
    /// Provider finish reason, when reported
    pub finish_reason: Option<String>,
}

/// Boxed stream of completion deltas
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamDelta>> + Send>>;

/// Accumulates tool-call fragments from streamed deltas.
///
/// Providers split a tool call across chunks: the id and name arrive first,
/// the JSON arguments trickle in as string fragments. Fragments are keyed by
/// the provider-assigned index so interleaved calls reassemble correctly.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<PartialCall>,
}

#[derive(Debug, Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one tool-call fragment.
    pub fn push(
        &mut self,
        index: usize,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) {
        while self.calls.len() <= index {
            self.calls.push(PartialCall::default());
        }
        let call = &mut self.calls[index];
        if let Some(id) = id {
            call.id.push_str(id);
        }
        if let Some(name) = name {
            call.name.push_str(name);
        }
        if let Some(arguments) = arguments {
            call.arguments.push_str(arguments);
        }
    }

    /// Whether any fragments have been absorbed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Finish accumulation, yielding the assembled calls in index order.
    ///
    /// Calls that never received a name are dropped; empty argument bodies
    /// become `{}` so downstream parsing always sees valid JSON.
    #[must_use]
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .filter(|c| !c.name.is_empty())
            .map(|c| ToolCall {
                id: c.id,
                name: c.name,
                arguments: if c.arguments.is_empty() {
                    "{}".to_string()
                } else {
                    c.arguments
                },
            })
            .collect()
    }
}
