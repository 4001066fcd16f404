//! Test utilities for bometa-core.
//!
//! Mock implementations for exercising agents without real provider
//! credentials. Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! bometa-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use bometa_core::{Agent, test_utils::MockProvider};
//!
//! # async fn example() -> Result<(), bometa_core::AgentError> {
//! let provider = MockProvider::new().with_text("Hello from mock!");
//!
//! let agent = Agent::builder().provider(provider).build()?;
//!
//! let response = agent.run("Hi").await?;
//! assert_eq!(response.text(), "Hello from mock!");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{ModelResponse, TokenUsage};
use crate::provider::{ModelProvider, ProviderError};
use crate::types::{ContentBlock, Message, Role, StopReason, ToolDefinition, ToolUseBlock};

/// What the provider saw on one `generate` call.
#[derive(Debug, Clone)]
struct ReceivedCall {
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    system_prompt: Option<String>,
}

/// A mock model provider for testing.
///
/// Returns pre-programmed responses in order and records every request.
///
/// ```rust
/// use bometa_core::test_utils::MockProvider;
/// use serde_json::json;
///
/// // Tool use followed by final response
/// let provider = MockProvider::new()
///     .with_tool_use("search_code", json!({"query": "Button"}))
///     .with_text("Button lives in components/button");
/// ```
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ModelResponse>>>,
    calls: Arc<Mutex<Vec<ReceivedCall>>>,
}

impl MockProvider {
    /// Create a new mock provider with no responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, message: Message, stop_reason: StopReason) -> Self {
        self.responses.lock().push(ModelResponse {
            message,
            stop_reason,
            usage: None,
        });
        self
    }

    /// Report token usage on the most recently added response.
    pub fn with_usage(self, input_tokens: usize, output_tokens: usize) -> Self {
        if let Some(last) = self.responses.lock().last_mut() {
            last.usage = Some(TokenUsage {
                input_tokens,
                output_tokens,
            });
        }
        self
    }

    /// Add a text response with `StopReason::EndTurn`.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(Message::assistant(text), StopReason::EndTurn)
    }

    /// Add a text response cut off with `StopReason::MaxTokens`.
    pub fn with_truncated_text(self, text: impl Into<String>) -> Self {
        self.push(Message::assistant(text), StopReason::MaxTokens)
    }

    /// Add a tool use response with `StopReason::ToolUse`.
    pub fn with_tool_use(self, tool_name: impl Into<String>, tool_input: serde_json::Value) -> Self {
        let message = Message {
            role: Role::Assistant,
            content: vec![tool_use_block(tool_name, tool_input)],
        };
        self.push(message, StopReason::ToolUse)
    }

    /// Add a response that says something and then calls a tool.
    pub fn with_text_and_tool_use(
        self,
        text: impl Into<String>,
        tool_name: impl Into<String>,
        tool_input: serde_json::Value,
    ) -> Self {
        let message = Message {
            role: Role::Assistant,
            content: vec![
                ContentBlock::Text(text.into()),
                tool_use_block(tool_name, tool_input),
            ],
        };
        self.push(message, StopReason::ToolUse)
    }

    /// Get the number of times `generate` was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Messages sent on the `index`-th call (empty if there was no such call).
    pub fn received_messages(&self, index: usize) -> Vec<Message> {
        self.calls
            .lock()
            .get(index)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Tool names offered on the `index`-th call.
    pub fn received_tool_names(&self, index: usize) -> Vec<String> {
        self.calls
            .lock()
            .get(index)
            .map(|c| c.tools.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    /// System prompt sent on the `index`-th call.
    pub fn received_system_prompt(&self, index: usize) -> Option<String> {
        self.calls
            .lock()
            .get(index)
            .and_then(|c| c.system_prompt.clone())
    }
}

fn tool_use_block(tool_name: impl Into<String>, tool_input: serde_json::Value) -> ContentBlock {
    ContentBlock::ToolUse(ToolUseBlock {
        id: format!("tool_{}", uuid::Uuid::new_v4()),
        name: tool_name.into(),
        input: tool_input,
    })
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<ModelResponse, ProviderError> {
        self.calls.lock().push(ReceivedCall {
            messages,
            tools,
            system_prompt,
        });

        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Err(ProviderError::Other(
                "MockProvider: No more responses configured".to_string(),
            ));
        }

        Ok(responses.remove(0))
    }
}
