//! Conversation turn state machine
//!
//! One turn runs `Idle → AwaitingModel → (ToolExecuting)* → Streaming →
//! Idle`. Tool calls are executed one at a time in the order the model
//! emitted them before the model is resumed; content fragments are forwarded
//! to the channel the moment they arrive. Any failure downgrades the turn to
//! the error path: a system chunk describing the failure, the open assistant
//! message discarded, session back to `Idle`. Nothing is retried.

use crate::protocol::{StreamChunk, PROCESSING_NOTICE};
use crate::server::prompt::SYSTEM_PROMPT;
use crate::server::session::Session;
use algodesk_llm::{
    CompletionRequest, LlmProvider, Message, StreamDelta, ToolCall, ToolCompletionRequest,
    ToolDefinition,
};
use algodesk_mcp::McpClient;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Upper bound on model/tool round trips within one turn
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// States of a session's turn machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for a user message
    Idle,
    /// Request sent to the model, waiting for its response
    AwaitingModel,
    /// Executing the tool calls the model requested
    ToolExecuting,
    /// Forwarding the model's final answer fragment by fragment
    Streaming,
}

/// Executes tool calls against the gateway on behalf of a turn
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tool catalogue in the model-facing shape
    fn tool_definitions(&self) -> Vec<ToolDefinition>;

    /// Execute one call, returning the JSON payload fed back to the model.
    ///
    /// Failures are folded into the payload; the model reads them, the turn
    /// does not abort.
    async fn execute(&self, call: &ToolCall) -> String;
}

/// [`ToolExecutor`] backed by the gateway's MCP connection
pub struct GatewayExecutor {
    mcp: Arc<McpClient>,
}

impl GatewayExecutor {
    /// Wrap a connected MCP client
    #[must_use]
    pub fn new(mcp: Arc<McpClient>) -> Self {
        Self { mcp }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for GatewayExecutor {
    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.mcp
            .list_tools()
            .into_iter()
            .map(|spec| ToolDefinition::new(spec.name, spec.description, spec.input_schema))
            .collect()
    }

    async fn execute(&self, call: &ToolCall) -> String {
        let arguments: serde_json::Value =
            serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                warn!(
                    tool = %call.name,
                    error = %e,
                    "Failed to parse tool arguments, using empty object"
                );
                json!({})
            });

        match self.mcp.call_tool(&call.name, arguments).await {
            Ok(result) => result.first_text().unwrap_or("{}").to_string(),
            Err(e) => json!({
                "status": "error",
                "error": {"kind": "gateway", "message": e.to_string()}
            })
            .to_string(),
        }
    }
}

/// Runs conversation turns for one session
pub struct TurnEngine {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolExecutor>,
    max_tool_iterations: usize,
}

impl TurnEngine {
    /// Create an engine over a provider and a tool executor
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<dyn ToolExecutor>) -> Self {
        Self {
            provider,
            tools,
            max_tool_iterations: MAX_TOOL_ITERATIONS,
        }
    }

    /// Process one user message through to the terminating chunk.
    ///
    /// Chunk emission order is the model's emission order; the terminator is
    /// always the last assistant chunk of a successful turn. Send failures
    /// (client gone) are ignored: an in-flight turn runs to completion.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        user_text: &str,
        tx: &UnboundedSender<StreamChunk>,
    ) {
        session.push_user(user_text);
        send(tx, StreamChunk::system(PROCESSING_NOTICE));
        info!(session = %session.id, "Turn started");

        match self.drive(session, tx).await {
            Ok(()) => info!(session = %session.id, "Turn complete"),
            Err(message) => {
                warn!(session = %session.id, error = %message, "Turn aborted");
                session.discard_open();
                send(
                    tx,
                    StreamChunk::system(format!(
                        "The assistant could not complete this request: {message}"
                    )),
                );
            }
        }
        // Either way the session is Idle again
    }

    async fn drive(
        &self,
        session: &mut Session,
        tx: &UnboundedSender<StreamChunk>,
    ) -> Result<(), String> {
        use futures::StreamExt;

        let mut state = TurnState::Idle;
        let mut messages = session.context_messages(SYSTEM_PROMPT);
        let tools = self.tools.tool_definitions();
        let mut streamed_any = false;

        for _ in 0..self.max_tool_iterations {
            transition(&mut state, TurnState::AwaitingModel, &session.id);

            let request = ToolCompletionRequest::new(
                CompletionRequest::default().with_messages(messages.clone()),
                tools.clone(),
            );
            let mut stream = self
                .provider
                .stream_with_tools(request)
                .await
                .map_err(|e| e.to_string())?;

            let mut finish = None;
            while let Some(delta) = stream.next().await {
                match delta.map_err(|e| e.to_string())? {
                    StreamDelta::Content(fragment) => {
                        if !session.has_open() {
                            session.open_assistant();
                        }
                        transition(&mut state, TurnState::Streaming, &session.id);
                        session.append_open(&fragment);
                        streamed_any = true;
                        send(tx, StreamChunk::fragment(fragment));
                    }
                    StreamDelta::Finish(f) => {
                        finish = Some(f);
                        break;
                    }
                }
            }
            let finish =
                finish.ok_or_else(|| "model stream ended without finishing".to_string())?;

            if finish.tool_calls.is_empty() {
                if streamed_any {
                    send(tx, StreamChunk::terminator());
                    session.close_open();
                    transition(&mut state, TurnState::Idle, &session.id);
                    return Ok(());
                }
                // Provider delivered the whole answer in one piece
                if let Some(content) = finish.content.filter(|c| !c.is_empty()) {
                    send(tx, StreamChunk::complete(content.clone()));
                    session.push_assistant(content);
                    transition(&mut state, TurnState::Idle, &session.id);
                    return Ok(());
                }
                return Err("the model returned an empty response".to_string());
            }

            transition(&mut state, TurnState::ToolExecuting, &session.id);
            messages.push(Message::assistant_tool_calls(finish.tool_calls.clone()));
            for call in &finish.tool_calls {
                info!(session = %session.id, tool = %call.name, "Executing tool call");
                let result = self.tools.execute(call).await;
                messages.push(Message::tool_response(&call.id, result));
            }
        }

        Err(format!(
            "tool call limit ({}) reached",
            self.max_tool_iterations
        ))
    }
}

fn transition(state: &mut TurnState, next: TurnState, session_id: &str) {
    if *state != next {
        debug!(session = %session_id, from = ?state, to = ?next, "Turn state");
        *state = next;
    }
}

fn send(tx: &UnboundedSender<StreamChunk>, chunk: StreamChunk) {
    // The client may have gone away mid-turn; the turn still runs to
    // completion, it just stops being observed.
    let _ = tx.send(chunk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use algodesk_llm::{CompletionStream, Error as LlmError, TurnFinish};
    use std::collections::VecDeque;
    use std::sync::Mutex;

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
                .ok_or_else(|| LlmError::Api("no scripted turn left".to_string()))?;
            Ok(Box::pin(futures::stream::iter(deltas)))
        }
    }

    struct NoTools;

    #[async_trait::async_trait]
    impl ToolExecutor for NoTools {
        fn tool_definitions(&self) -> Vec<ToolDefinition> {
            Vec::new()
        }

        async fn execute(&self, _call: &ToolCall) -> String {
            panic!("no tool calls expected")
        }
    }

    fn finish(tool_calls: Vec<ToolCall>) -> algodesk_llm::Result<StreamDelta> {
        Ok(StreamDelta::Finish(TurnFinish {
            tool_calls,
            content: None,
            finish_reason: Some("stop".to_string()),
        }))
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StreamChunk>) -> Vec<StreamChunk> {
        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn test_plain_answer_streams_and_terminates() {
        let provider = ScriptedProvider::new(vec![vec![
            Ok(StreamDelta::Content("Hello ".to_string())),
            Ok(StreamDelta::Content("there".to_string())),
            finish(vec![]),
        ]]);
        let engine = TurnEngine::new(provider, Arc::new(NoTools));
        let mut session = Session::new("t");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        engine.run_turn(&mut session, "hi", &tx).await;

        let chunks = drain(&mut rx);
        assert_eq!(chunks[0], StreamChunk::system(PROCESSING_NOTICE));
        assert_eq!(chunks[1], StreamChunk::fragment("Hello "));
        assert_eq!(chunks[2], StreamChunk::fragment("there"));
        assert_eq!(chunks[3], StreamChunk::terminator());
        assert_eq!(session.transcript().last().unwrap().content, "Hello there");
    }

    #[tokio::test]
    async fn test_unstreamed_answer_sent_complete() {
        let provider = ScriptedProvider::new(vec![vec![Ok(StreamDelta::Finish(TurnFinish {
            tool_calls: vec![],
            content: Some("Full answer".to_string()),
            finish_reason: Some("stop".to_string()),
        }))]]);
        let engine = TurnEngine::new(provider, Arc::new(NoTools));
        let mut session = Session::new("t");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        engine.run_turn(&mut session, "hi", &tx).await;

        let chunks = drain(&mut rx);
        assert_eq!(chunks[1], StreamChunk::complete("Full answer"));
        assert_eq!(session.transcript().last().unwrap().content, "Full answer");
    }

    #[tokio::test]
    async fn test_provider_error_takes_error_path() {
        let provider = ScriptedProvider::new(vec![vec![Err(LlmError::Api(
            "rate limited".to_string(),
        ))]]);
        let engine = TurnEngine::new(provider, Arc::new(NoTools));
        let mut session = Session::new("t");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        engine.run_turn(&mut session, "hi", &tx).await;

        let chunks = drain(&mut rx);
        let last = chunks.last().unwrap();
        assert_eq!(last.role, crate::protocol::Role::System);
        assert!(last.content.contains("rate limited"));
        assert!(!session.has_open());
        // No partial assistant message was committed
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_limit_aborts_turn() {
        // The model keeps asking for the same tool forever
        let turns: Vec<Vec<algodesk_llm::Result<StreamDelta>>> = (0..MAX_TOOL_ITERATIONS)
            .map(|i| {
                vec![finish(vec![ToolCall {
                    id: format!("call_{i}"),
                    name: "get_funds".to_string(),
                    arguments: "{}".to_string(),
                }])]
            })
            .collect();
        let provider = ScriptedProvider::new(turns);

        struct CountingTools(Mutex<usize>);

        #[async_trait::async_trait]
        impl ToolExecutor for CountingTools {
            fn tool_definitions(&self) -> Vec<ToolDefinition> {
                Vec::new()
            }

            async fn execute(&self, _call: &ToolCall) -> String {
                *self.0.lock().unwrap() += 1;
                r#"{"status": "success"}"#.to_string()
            }
        }

        let tools = Arc::new(CountingTools(Mutex::new(0)));
        let engine = TurnEngine::new(provider, tools.clone());
        let mut session = Session::new("t");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        engine.run_turn(&mut session, "hi", &tx).await;

        assert_eq!(*tools.0.lock().unwrap(), MAX_TOOL_ITERATIONS);
        let chunks = drain(&mut rx);
        assert!(chunks.last().unwrap().content.contains("tool call limit"));
    }
}
