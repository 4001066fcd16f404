//! # bometa-core
//!
//! Agent runtime behind the bometa chat gateway.
//!
//! An [`Agent`] composes a model provider, a system prompt and a named
//! [`Toolset`]. It answers a conversation either in one piece ([`Agent::run_chat`])
//! or as a stream of text chunks ([`Agent::run_stream`]), calling tools between
//! model turns.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bometa_core::{Agent, AnthropicProvider, ModelSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = Agent::builder()
//!         .provider(AnthropicProvider::from_env(ModelSpec::default_chat())?)
//!         .with_system_prompt("You answer questions about ant-design.")
//!         .build()?;
//!
//!     let response = agent.run("How do I theme a Button?").await?;
//!     println!("{}", response);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Tools
//!
//! Implement the [`Tool`] trait and collect tools into a [`Toolset`]:
//!
//! ```ignore
//! use bometa_core::{Tool, ToolError, ToolResult, Toolset};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct LookupInput {
//!     number: u64,
//! }
//!
//! struct LookupIssue;
//!
//! impl Tool for LookupIssue {
//!     type Input = LookupInput;
//!
//!     fn name(&self) -> &str { "lookup_issue" }
//!     fn description(&self) -> &str { "Look up an issue by number" }
//!
//!     async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
//!         Ok(ToolResult::text(format!("issue #{}", input.number)))
//!     }
//! }
//!
//! let tools = Toolset::new().with_tool(LookupIssue);
//! ```
//!
//! Tools that depend on the caller (which bot, which credentials) are
//! produced per request by a [`ToolsetFactory`] from a [`ToolScope`].
//!
//! ## Feature Flags
//!
//! - `anthropic` - Anthropic Messages API provider (enabled by default)
//! - `test-utils` - [`test_utils::MockProvider`] for downstream tests

pub mod agent;
pub mod model;
pub mod provider;
pub mod tool;
pub mod toolset;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agent::{
    Agent, AgentBuilder, AgentError, AgentResponse, ToolCallInfo,
    DEFAULT_MAX_CONCURRENT_TOOLS, DEFAULT_MAX_ITERATIONS,
};
pub use model::{ModelResponse, ModelSpec, TokenUsage};
pub use provider::{ModelProvider, ProviderError, StreamEvent};

#[cfg(feature = "anthropic")]
pub use provider::AnthropicProvider;

pub use tool::{box_tool, DynTool, Tool, ToolError, ToolResult};
pub use toolset::{ToolScope, Toolset, ToolsetFactory};
pub use types::{
    ContentBlock, Message, Role, StopReason, ToolDefinition, ToolResultBlock, ToolResultStatus,
    ToolUseBlock,
};
