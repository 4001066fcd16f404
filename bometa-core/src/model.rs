//! Model handles and responses
//!
//! A [`ModelSpec`] names the model a bot is configured with; providers turn
//! it into API calls. Bots carry their model as a string id, which
//! [`ModelSpec::from_id`] maps onto the known catalog.

use serde::{Deserialize, Serialize};

use crate::types::{Message, StopReason};

/// Token usage statistics reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Response from a model completion
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// The assistant's response message
    pub message: Message,
    /// Why the model stopped generating
    pub stop_reason: StopReason,
    /// Token usage statistics (if provided by the model)
    pub usage: Option<TokenUsage>,
}

/// A model id, its display name and how many tokens it may write per answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub id: String,
    pub name: String,
    pub max_output_tokens: usize,
}

impl ModelSpec {
    /// Default model for bots that do not name one.
    pub fn default_chat() -> Self {
        Self::from_id("claude-sonnet-4-5")
    }

    /// Resolve a model id into a spec.
    ///
    /// Unknown ids are passed through to the provider unchanged with a
    /// conservative output limit.
    pub fn from_id(id: &str) -> Self {
        let (name, output) = match id {
            "claude-sonnet-4-5" => ("Claude Sonnet 4.5", 64_000),
            "claude-haiku-4-5" => ("Claude Haiku 4.5", 64_000),
            "claude-opus-4-1" => ("Claude Opus 4.1", 32_000),
            _ => (id, 4_096),
        };

        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_output_tokens: output,
        }
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::default_chat()
    }
}
