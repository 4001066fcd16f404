//! The seam between the agent and a model API.
//!
//! The gateway ships one provider, for the Anthropic Messages API, behind
//! the `anthropic` feature. Tests swap in `test_utils::MockProvider`.

#[cfg(feature = "anthropic")]
pub mod anthropic;

use crate::model::{ModelResponse, TokenUsage};
use crate::types::{Message, StopReason, ToolDefinition, ToolUseBlock};
use futures::stream::BoxStream;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicProvider;

/// One piece of a streamed model answer
#[derive(Debug, Clone)]
pub enum StreamEvent {
    TextDelta(String),
    ToolUse(ToolUseBlock),
    /// Always the last event of a turn
    Stop {
        stop_reason: StopReason,
        usage: Option<TokenUsage>,
    },
}

/// Failure talking to a model API, classified by what the caller can do about it
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Bad or missing API key
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Connection or timeout failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// The API rejected the request itself, e.g. an oversized conversation
    #[error("Model error: {0}")]
    Model(String),

    /// 5xx or overloaded responses
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The provider could not be set up, e.g. a missing environment variable
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

/// A chat model the agent can send a conversation to.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Display name, logged with each chat request.
    fn name(&self) -> &str;

    /// Answer one turn of `messages`, offering `tools` to the model.
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<ModelResponse, ProviderError>;

    /// Answer one turn as a stream of events.
    ///
    /// Providers without native streaming get this default, which sends the
    /// whole text as a single delta followed by any tool uses.
    async fn generate_stream(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        let response = self.generate(messages, tools, system_prompt).await?;

        let mut events = Vec::new();
        let text = response.message.text();
        if !text.is_empty() {
            events.push(Ok(StreamEvent::TextDelta(text)));
        }
        events.extend(
            response
                .message
                .tool_uses()
                .into_iter()
                .map(|tool_use| Ok(StreamEvent::ToolUse(tool_use.clone()))),
        );
        events.push(Ok(StreamEvent::Stop {
            stop_reason: response.stop_reason,
            usage: response.usage,
        }));

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

#[async_trait::async_trait]
impl ModelProvider for std::sync::Arc<dyn ModelProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<ModelResponse, ProviderError> {
        (**self).generate(messages, tools, system_prompt).await
    }

    async fn generate_stream(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        (**self)
            .generate_stream(messages, tools, system_prompt)
            .await
    }
}
