//! The named toolset handed to the Q&A agent.

use std::sync::Arc;

use bometa_core::{ToolError, ToolScope, Toolset, ToolsetFactory};

use crate::github::{
    CreateIssueTool, CreatePrSummaryTool, CreateReviewCommentTool, GetFileContentTool,
    GetIssuesTool, GitHubClient, SearchCodeTool, SearchIssuesTool, SearchRepoTool,
};
use crate::knowledge::{EmptyKnowledgeBase, KnowledgeBase, SearchKnowledgeTool};

/// Capability names every Q&A toolset exposes.
pub const QA_TOOL_NAMES: [&str; 9] = [
    "search_knowledge",
    "create_issue",
    "get_issues",
    "get_file_content",
    "create_review_comment",
    "create_pr_summary",
    "search_issues",
    "search_code",
    "search_repo",
];

/// Builds the Q&A toolset for each chat request.
///
/// GitHub tools act with the request's token when the scope carries one and
/// fall back to the factory's service token otherwise. Anonymous scopes never
/// get the service token, so their write tools fail for lack of a token. The
/// knowledge tool is bound to the scope's bot.
///
/// ```ignore
/// use bometa_core::{ToolScope, ToolsetFactory};
/// use bometa_tools::QaToolsFactory;
///
/// let factory = QaToolsFactory::new("https://api.github.com")?;
/// let tools = factory.toolset(&ToolScope::for_bot("bot-1"));
/// assert_eq!(tools.len(), 9);
/// ```
#[derive(Clone)]
pub struct QaToolsFactory {
    github: GitHubClient,
    service_token: Option<String>,
    knowledge: Arc<dyn KnowledgeBase>,
}

impl QaToolsFactory {
    pub fn new(github_api_url: &str) -> Result<Self, ToolError> {
        Ok(Self {
            github: GitHubClient::new(github_api_url)?,
            service_token: None,
            knowledge: Arc::new(EmptyKnowledgeBase),
        })
    }

    /// Token used when a request brings none of its own.
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    pub fn with_knowledge_base(mut self, knowledge: impl KnowledgeBase + 'static) -> Self {
        self.knowledge = Arc::new(knowledge);
        self
    }

    pub fn with_shared_knowledge_base(mut self, knowledge: Arc<dyn KnowledgeBase>) -> Self {
        self.knowledge = knowledge;
        self
    }

    fn github_for(&self, scope: &ToolScope) -> GitHubClient {
        let service_token = self.service_token.as_ref().filter(|_| !scope.anonymous);
        match scope.github_token.as_ref().or(service_token) {
            Some(token) => self.github.clone().with_token(token.clone()),
            None => self.github.clone(),
        }
    }
}

impl std::fmt::Debug for QaToolsFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaToolsFactory")
            .field("github", &self.github)
            .field("service_token", &self.service_token.is_some())
            .finish()
    }
}

impl ToolsetFactory for QaToolsFactory {
    fn toolset(&self, scope: &ToolScope) -> Toolset {
        let github = self.github_for(scope);

        Toolset::new()
            .with_named(
                "search_knowledge",
                SearchKnowledgeTool::new(scope.bot_id.clone(), self.knowledge.clone()),
            )
            .with_named("create_issue", CreateIssueTool::new(github.clone()))
            .with_named("get_issues", GetIssuesTool::new(github.clone()))
            .with_named("get_file_content", GetFileContentTool::new(github.clone()))
            .with_named(
                "create_review_comment",
                CreateReviewCommentTool::new(github.clone()),
            )
            .with_named("create_pr_summary", CreatePrSummaryTool::new(github.clone()))
            .with_named("search_issues", SearchIssuesTool::new(github.clone()))
            .with_named("search_code", SearchCodeTool::new(github.clone()))
            .with_named("search_repo", SearchRepoTool::new(github))
    }
}
