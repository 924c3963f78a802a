//! Provider trait and environment-driven provider selection

use crate::completion::ToolCompletionRequest;
use crate::error::{Error, Result};
use crate::groq::GroqProvider;
use crate::openai::OpenAiProvider;
use crate::stream::CompletionStream;
use std::sync::Arc;
use tracing::info;

/// A hosted LLM provider capable of tool calling and token streaming
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (for logging and status reporting)
    fn name(&self) -> &str;

    /// Model used when a request leaves the model field empty
    fn default_model(&self) -> &str;

    /// Stream a chat completion with the tool catalogue attached.
    ///
    /// The returned stream yields content fragments in emission order and
    /// terminates with a single [`crate::StreamDelta::Finish`] item.
    async fn stream_with_tools(&self, request: ToolCompletionRequest) -> Result<CompletionStream>;
}

/// Supported provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Groq (OpenAI-compatible)
    Groq,
}

impl std::str::FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            other => Err(Error::NotConfigured(format!(
                "unknown LLM provider '{other}' (expected 'openai' or 'groq')"
            ))),
        }
    }
}

/// Build a provider from the `LLM_PROVIDER` environment variable.
///
/// Defaults to OpenAI. The selected provider's own configuration (API key,
/// model) is also read from the environment; a missing credential is an
/// error so the caller can fail at startup rather than at first use.
pub fn provider_from_env() -> Result<Arc<dyn LlmProvider>> {
    let kind: ProviderKind = std::env::var("LLM_PROVIDER")
        .unwrap_or_else(|_| "openai".to_string())
        .parse()?;

    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::from_env()?),
        ProviderKind::Groq => Arc::new(GroqProvider::from_env()?),
    };

    info!(
        provider = provider.name(),
        model = provider.default_model(),
        "LLM provider configured"
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("GROQ".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert!("claude".parse::<ProviderKind>().is_err());
    }
}
