//! Errors and results of an agent run

use std::time::Duration;
use thiserror::Error;

use crate::model::TokenUsage;
use crate::provider::ProviderError;
use crate::tool::ToolError;

/// Why a chat run ended without an answer
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// `AgentBuilder::build` was called without a provider
    #[error("No provider configured. Call .provider() before .build()")]
    NoProvider,

    /// The final turn carried no text
    #[error("Model returned no text response")]
    NoResponse,

    /// The final turn carried neither text nor tool use
    #[error("Model returned empty response with no text or tool use")]
    EmptyResponse,

    /// The answer was cut off at the output token limit
    #[error("Response exceeded maximum token limit. Try asking the model to be more concise or break the task into smaller steps.")]
    MaxTokensExceeded,

    /// The model kept requesting tools past the iteration limit
    #[error("Agent stopped after {0} model calls without a final answer")]
    MaxIterationsExceeded(usize),

    /// The model named a tool that is not in the toolset
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments were not a JSON object
    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    #[error("Unexpected stop reason: {0}")]
    UnexpectedStopReason(String),
}

/// Tool calls run in parallel up to this many at a time.
pub const DEFAULT_MAX_CONCURRENT_TOOLS: usize = 8;

/// A run gives up after this many model calls.
pub const DEFAULT_MAX_ITERATIONS: usize = 16;

/// Outcome of one chat run.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Final answer text.
    pub text: String,
    /// Tool calls in the order the model requested them.
    pub tool_calls: Vec<ToolCallInfo>,
    /// Tokens summed over every model call. Zero when the provider reports none.
    pub usage: TokenUsage,
    /// Model calls made, counting the ones that followed tool results.
    pub model_calls: usize,
    /// Wall time of the whole run.
    pub duration: Duration,
}

impl AgentResponse {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A tool the model called and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallInfo {
    pub name: String,
    pub success: bool,
}
