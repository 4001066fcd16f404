//! Application state for the gateway.

use std::collections::BTreeMap;
use std::sync::Arc;

use bometa_core::{Agent, AgentError, ModelProvider, ToolScope, ToolsetFactory};

/// System prompts: one base prompt plus per-bot overrides.
#[derive(Debug, Clone, Default)]
pub struct Prompts {
    pub base: String,
    pub bots: BTreeMap<String, String>,
}

impl Prompts {
    /// Bot prompt (or the base prompt) followed by a blank line and the
    /// request's own prompt when it carries one.
    pub fn compose(&self, bot_id: Option<&str>, request_prompt: Option<&str>) -> String {
        let prompt = bot_id
            .and_then(|id| self.bots.get(id))
            .unwrap_or(&self.base);

        match request_prompt {
            Some(extra) => format!("{prompt}\n\n{extra}"),
            None => prompt.clone(),
        }
    }
}

/// Shared application state.
///
/// Cloned for each request. An agent is built per request since its prompt
/// and tools depend on the bot and the caller.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ModelProvider>,
    pub tools: Arc<dyn ToolsetFactory>,
    pub prompts: Arc<Prompts>,
    pub max_iterations: usize,
}

impl AppState {
    pub fn agent_for(
        &self,
        scope: &ToolScope,
        request_prompt: Option<&str>,
    ) -> Result<Agent, AgentError> {
        Agent::builder()
            .shared_provider(self.provider.clone())
            .with_system_prompt(self.prompts.compose(scope.bot_id.as_deref(), request_prompt))
            .with_toolset(self.tools.toolset(scope))
            .with_max_iterations(self.max_iterations)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts() -> Prompts {
        Prompts {
            base: "base".to_string(),
            bots: BTreeMap::from([("docs".to_string(), "docs bot".to_string())]),
        }
    }

    #[test]
    fn test_compose_uses_base_prompt() {
        assert_eq!(prompts().compose(None, None), "base");
        assert_eq!(prompts().compose(Some("unknown"), None), "base");
    }

    #[test]
    fn test_compose_uses_bot_prompt() {
        assert_eq!(prompts().compose(Some("docs"), None), "docs bot");
    }

    #[test]
    fn test_compose_appends_request_prompt() {
        assert_eq!(
            prompts().compose(Some("docs"), Some("Answer in French.")),
            "docs bot\n\nAnswer in French."
        );
    }
}
