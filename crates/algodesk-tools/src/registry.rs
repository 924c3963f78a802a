//! Tool registration and discovery

use algodesk_broker::ToolOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Tool metadata and parameter schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given input.
    ///
    /// Never fails at the call boundary: argument and platform errors are
    /// folded into [`ToolOutcome::Failure`].
    async fn execute(&self, input: Value) -> ToolOutcome;
}

/// Registry for the tool catalogue
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its definition name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool definitions in name order
    #[must_use]
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| tool.definition().clone())
            .collect()
    }

    /// Execute a tool by name.
    ///
    /// An unknown name is a failure outcome, not an error: the model may
    /// hallucinate tool names and must be able to read the rejection.
    pub async fn execute(&self, name: &str, input: Value) -> ToolOutcome {
        match self.get(name) {
            Some(tool) => tool.execute(input).await,
            None => ToolOutcome::Failure {
                kind: "unknown_tool".to_string(),
                message: format!("tool '{name}' is not registered"),
            },
        }
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: Value) -> ToolOutcome {
            ToolOutcome::Success(input)
        }
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool {
            definition: ToolDefinition::new("echo", "Echo input", serde_json::json!({})),
        }));

        assert!(registry.has("echo"));
        assert_eq!(registry.len(), 1);

        let outcome = registry.execute("echo", serde_json::json!({"a": 1})).await;
        assert_eq!(outcome, ToolOutcome::Success(serde_json::json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure_not_error() {
        let registry = ToolRegistry::new();
        let outcome = registry.execute("missing", serde_json::json!({})).await;
        match outcome {
            ToolOutcome::Failure { kind, message } => {
                assert_eq!(kind, "unknown_tool");
                assert!(message.contains("missing"));
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
