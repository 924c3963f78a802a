//! End-to-end streaming tests
//!
//! Drives a full conversation turn through the turn engine with a scripted
//! provider and a recording tool executor, serializes every emitted chunk
//! through the wire format, and reconciles them on the client side — the
//! whole relay path minus the sockets.

use algodesk::chat::reconcile::{Reconciler, RenderEvent};
use algodesk::protocol::{Role, StreamChunk};
use algodesk::server::session::Session;
use algodesk::server::turn::{ToolExecutor, TurnEngine};
use algodesk_llm::{
    CompletionStream, LlmProvider, StreamDelta, ToolCall, ToolCompletionRequest, ToolDefinition,
    TurnFinish,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct ScriptedProvider {
    turns: Mutex<VecDeque<Vec<algodesk_llm::Result<StreamDelta>>>>,
}

impl ScriptedProvider {
    fn new(turns: Vec<Vec<algodesk_llm::Result<StreamDelta>>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn stream_with_tools(
        &self,
        _request: ToolCompletionRequest,
    ) -> algodesk_llm::Result<CompletionStream> {
        let deltas = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted provider ran out of turns");
        Ok(Box::pin(futures::stream::iter(deltas)))
    }
}

struct RecordingExecutor {
    calls: Mutex<Vec<ToolCall>>,
    result: String,
}

impl RecordingExecutor {
    fn new(result: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            result: result.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ToolExecutor for RecordingExecutor {
    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            "get_funds",
            "Get available funds and margin information.",
            json!({"type": "object", "properties": {}}),
        )]
    }

    async fn execute(&self, call: &ToolCall) -> String {
        self.calls.lock().unwrap().push(call.clone());
        self.result.clone()
    }
}

/// Collect a turn's chunks, round-tripped through the wire format.
async fn run_turn_over_wire(
    engine: &TurnEngine,
    session: &mut Session,
    user_text: &str,
) -> Vec<StreamChunk> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    engine.run_turn(session, user_text, &tx).await;

    let mut chunks = Vec::new();
    while let Ok(chunk) = rx.try_recv() {
        let wire = serde_json::to_string(&chunk).expect("serialize chunk");
        chunks.push(serde_json::from_str(&wire).expect("parse chunk"));
    }
    chunks
}

#[tokio::test]
async fn funds_query_streams_through_tool_call_to_final_bubble() {
    // "Show my available funds" → tool call → two-fragment answer
    let provider = ScriptedProvider::new(vec![
        vec![Ok(StreamDelta::Finish(TurnFinish {
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "get_funds".to_string(),
                arguments: "{}".to_string(),
            }],
            content: None,
            finish_reason: Some("tool_calls".to_string()),
        }))],
        vec![
            Ok(StreamDelta::Content("Your available ".to_string())),
            Ok(StreamDelta::Content("margin is ₹50,000.".to_string())),
            Ok(StreamDelta::Finish(TurnFinish::default())),
        ],
    ]);
    let executor = RecordingExecutor::new(r#"{"status": "success", "data": {"availablecash": "50000"}}"#);
    let engine = TurnEngine::new(provider, executor.clone());
    let mut session = Session::new("tab-1");

    let chunks = run_turn_over_wire(&engine, &mut session, "Show my available funds").await;

    // The gateway saw exactly one call, in model emission order
    let calls = executor.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "get_funds");
    drop(calls);

    // Wire sequence: processing notice, two fragments, terminator
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0].role, Role::System);
    assert_eq!(chunks[1], StreamChunk::fragment("Your available "));
    assert_eq!(chunks[2], StreamChunk::fragment("margin is ₹50,000."));
    assert_eq!(chunks[3], StreamChunk::terminator());

    // Client-side reconciliation yields exactly the concatenation
    let mut reconciler = Reconciler::new();
    reconciler.on_user_send("Show my available funds");
    let mut closed = None;
    for chunk in &chunks {
        if let Some(RenderEvent::Closed { raw, .. }) = reconciler.on_chunk(chunk) {
            closed = Some(raw);
        }
    }
    assert_eq!(closed.as_deref(), Some("Your available margin is ₹50,000."));

    // Relay-side transcript matches
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].content, "Your available margin is ₹50,000.");
}

#[tokio::test]
async fn turns_are_serialized_on_the_channel() {
    let provider = ScriptedProvider::new(vec![
        vec![
            Ok(StreamDelta::Content("first".to_string())),
            Ok(StreamDelta::Finish(TurnFinish::default())),
        ],
        vec![
            Ok(StreamDelta::Content("second".to_string())),
            Ok(StreamDelta::Finish(TurnFinish::default())),
        ],
    ]);
    let executor = RecordingExecutor::new("{}");
    let engine = TurnEngine::new(provider, executor);
    let mut session = Session::new("tab-1");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    engine.run_turn(&mut session, "one", &tx).await;
    engine.run_turn(&mut session, "two", &tx).await;

    let mut chunks = Vec::new();
    while let Ok(chunk) = rx.try_recv() {
        chunks.push(chunk);
    }

    // No fragment of turn two may precede the terminator of turn one
    let first_terminator = chunks
        .iter()
        .position(|c| c == &StreamChunk::terminator())
        .expect("turn one terminator");
    let second_fragment = chunks
        .iter()
        .position(|c| c == &StreamChunk::fragment("second"))
        .expect("turn two fragment");
    assert!(first_terminator < second_fragment);
}

#[tokio::test]
async fn tool_failure_is_explained_not_fatal() {
    // The tool fails; the model reads the error payload and explains it
    let provider = ScriptedProvider::new(vec![
        vec![Ok(StreamDelta::Finish(TurnFinish {
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "get_funds".to_string(),
                arguments: "{}".to_string(),
            }],
            content: None,
            finish_reason: Some("tool_calls".to_string()),
        }))],
        vec![
            Ok(StreamDelta::Content(
                "The platform rejected the request.".to_string(),
            )),
            Ok(StreamDelta::Finish(TurnFinish::default())),
        ],
    ]);
    let executor = RecordingExecutor::new(
        r#"{"status": "error", "error": {"kind": "api", "message": "session expired"}}"#,
    );
    let engine = TurnEngine::new(provider, executor);
    let mut session = Session::new("tab-1");

    let chunks = run_turn_over_wire(&engine, &mut session, "Show my funds").await;

    // The turn completed normally: fragments plus terminator, no error notice
    assert_eq!(chunks.last(), Some(&StreamChunk::terminator()));
    assert_eq!(
        session.transcript().last().unwrap().content,
        "The platform rejected the request."
    );
}
