//! AgentBuilder for fluent agent construction

use std::sync::Arc;

use crate::provider::ModelProvider;
use crate::tool::Tool;
use crate::toolset::Toolset;

use super::types::{AgentError, DEFAULT_MAX_CONCURRENT_TOOLS, DEFAULT_MAX_ITERATIONS};
use super::Agent;

/// Builder for creating an Agent with fluent configuration
///
/// Use `Agent::builder()` to create a new builder, configure it with the
/// `with_*` methods, and call `.build()` to create the agent.
pub struct AgentBuilder {
    provider: Option<Arc<dyn ModelProvider>>,
    tools: Toolset,
    system_prompt: Option<String>,
    max_concurrent_tools: usize,
    max_iterations: usize,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Toolset::new(),
            system_prompt: None,
            max_concurrent_tools: DEFAULT_MAX_CONCURRENT_TOOLS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Use a provider instance
    pub fn provider(mut self, provider: impl ModelProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Use a provider that is shared with other agents
    pub fn shared_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Replace the toolset wholesale
    pub fn with_toolset(mut self, tools: Toolset) -> Self {
        self.tools = tools;
        self
    }

    /// Add a single tool under its own name
    pub fn add_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools = self.tools.with_tool(tool);
        self
    }

    /// Limit how many tool calls from one model turn run at once
    pub fn with_max_concurrent_tools(mut self, max: usize) -> Self {
        self.max_concurrent_tools = max.max(1);
        self
    }

    /// Limit how many model calls one run may make
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Build the agent
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoProvider`] when no provider was configured.
    pub fn build(self) -> Result<Agent, AgentError> {
        let provider = self.provider.ok_or(AgentError::NoProvider)?;

        Ok(Agent {
            provider,
            system_prompt: self.system_prompt,
            tools: self.tools,
            max_concurrent_tools: self.max_concurrent_tools,
            max_iterations: self.max_iterations,
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelResponse;
    use crate::provider::ProviderError;
    use crate::types::{Message, StopReason, ToolDefinition};

    struct NamedProvider;

    #[async_trait::async_trait]
    impl ModelProvider for NamedProvider {
        fn name(&self) -> &str {
            "NamedProvider"
        }

        async fn generate(
            &self,
            _messages: Vec<Message>,
            _tools: Vec<ToolDefinition>,
            _system_prompt: Option<String>,
        ) -> Result<ModelResponse, ProviderError> {
            Ok(ModelResponse {
                message: Message::assistant("ok"),
                stop_reason: StopReason::EndTurn,
                usage: None,
            })
        }
    }

    #[test]
    fn test_build_without_provider_fails() {
        let result = Agent::builder().with_system_prompt("hi").build();
        assert!(matches!(result, Err(AgentError::NoProvider)));
    }

    #[test]
    fn test_build_applies_configuration() {
        let agent = Agent::builder()
            .provider(NamedProvider)
            .with_system_prompt("You are helpful")
            .with_max_concurrent_tools(0)
            .with_max_iterations(3)
            .build()
            .unwrap();

        assert_eq!(agent.model_name(), "NamedProvider");
        assert_eq!(agent.system_prompt(), Some("You are helpful"));
        assert_eq!(agent.max_concurrent_tools, 1);
        assert_eq!(agent.max_iterations, 3);
        assert!(agent.toolset().is_empty());
    }

    #[test]
    fn test_shared_provider() {
        let provider: Arc<dyn ModelProvider> = Arc::new(NamedProvider);
        let first = Agent::builder()
            .shared_provider(provider.clone())
            .build()
            .unwrap();
        let second = Agent::builder().shared_provider(provider).build().unwrap();

        assert_eq!(first.model_name(), second.model_name());
    }
}
