//! Named tool mappings handed to the agent.
//!
//! A [`Toolset`] maps capability names (`"create_issue"`, `"search_code"`, ...)
//! to tool implementations. The name under which a tool is registered is the
//! name the model sees, so a toolset can expose one implementation under a
//! deployment-specific alias.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::tool::{box_tool, DynTool, Tool};
use crate::types::ToolDefinition;

/// Ordered mapping from capability name to tool.
#[derive(Clone, Default)]
pub struct Toolset {
    tools: BTreeMap<String, Arc<dyn DynTool>>,
}

impl Toolset {
    /// Create an empty toolset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.insert_boxed(tool.name().to_string(), box_tool(tool));
        self
    }

    /// Register a tool under an explicit capability name.
    pub fn with_named<T: Tool + 'static>(mut self, name: impl Into<String>, tool: T) -> Self {
        self.insert_boxed(name.into(), box_tool(tool));
        self
    }

    /// Register an already type-erased tool.
    ///
    /// Returns the tool previously registered under `name`, if any.
    pub fn insert_boxed(
        &mut self,
        name: impl Into<String>,
        tool: Box<dyn DynTool>,
    ) -> Option<Arc<dyn DynTool>> {
        self.tools.insert(name.into(), Arc::from(tool))
    }

    /// Look up a tool by capability name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynTool>> {
        self.tools.get(name)
    }

    /// Capability names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions for the model, named by capability.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(name, tool)| ToolDefinition {
                name: name.clone(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }
}

impl std::fmt::Debug for Toolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolset")
            .field("tools", &self.names())
            .finish()
    }
}

/// Per-request inputs a [`ToolsetFactory`] may bind into its tools.
#[derive(Debug, Clone, Default)]
pub struct ToolScope {
    /// Bot whose knowledge base and prompt apply to this request.
    pub bot_id: Option<String>,
    /// Token to act on the code host with, when the caller has one.
    pub github_token: Option<String>,
    /// The caller is an anonymous client. Factories must not lend it
    /// deployment credentials.
    pub anonymous: bool,
}

impl ToolScope {
    pub fn for_bot(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: Some(bot_id.into()),
            ..Self::default()
        }
    }

    pub fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }
}

/// Builds the toolset for one chat request.
pub trait ToolsetFactory: Send + Sync {
    fn toolset(&self, scope: &ToolScope) -> Toolset;
}

/// A fixed toolset ignores the scope.
impl ToolsetFactory for Toolset {
    fn toolset(&self, _scope: &ToolScope) -> Toolset {
        self.clone()
    }
}
