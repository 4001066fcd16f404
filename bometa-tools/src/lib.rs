//! Callback tools for the bometa Q&A agent.
//!
//! [`QaToolsFactory`] assembles the fixed capability mapping the chat
//! endpoints hand to the agent: GitHub issue, pull request, code and
//! repository tools plus a knowledge lookup bound to the requesting bot.

pub mod factory;
pub mod github;
pub mod knowledge;

pub use factory::{QaToolsFactory, QA_TOOL_NAMES};
pub use github::GitHubClient;
pub use knowledge::{EmptyKnowledgeBase, HttpKnowledgeBase, KnowledgeBase, KnowledgeChunk};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use bometa_core::{Tool, ToolError, ToolResult};
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
}
