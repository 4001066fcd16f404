//! Agent module for orchestrating LLM interactions with tools
//!
//! The Agent composes a model provider, a system prompt and a named
//! [`Toolset`]. Agents are cheap to build, so the gateway builds one per
//! chat request with the tools bound to that request's scope.

mod builder;
mod helpers;
mod run;
mod stream;
mod tools;
mod types;

pub use builder::AgentBuilder;
pub use types::{
    AgentError, AgentResponse, ToolCallInfo, DEFAULT_MAX_CONCURRENT_TOOLS, DEFAULT_MAX_ITERATIONS,
};

use std::sync::Arc;

use crate::provider::ModelProvider;
use crate::toolset::Toolset;

/// Agent that orchestrates interactions between a language model and tools
///
/// ```ignore
/// use bometa_core::{Agent, AnthropicProvider, ModelSpec};
///
/// let agent = Agent::builder()
///     .provider(AnthropicProvider::from_env(ModelSpec::default_chat())?)
///     .with_system_prompt("You answer questions about ant-design")
///     .with_toolset(toolset)
///     .build()?;
///
/// let response = agent.run("How do I theme a Button?").await?;
/// println!("{}", response.text());
/// ```
pub struct Agent {
    pub(super) provider: Arc<dyn ModelProvider>,
    pub(super) system_prompt: Option<String>,
    pub(super) tools: Toolset,
    pub(super) max_concurrent_tools: usize,
    pub(super) max_iterations: usize,
}

impl Agent {
    /// Create a new builder
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the model name for display
    pub fn model_name(&self) -> &str {
        self.provider.name()
    }

    /// The system prompt sent with every model call
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// The tools this agent may call, by capability name
    pub fn toolset(&self) -> &Toolset {
        &self.tools
    }
}
