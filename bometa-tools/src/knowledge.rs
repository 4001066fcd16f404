//! Knowledge-base lookup bound to one bot.
//!
//! Retrieval itself lives behind the [`KnowledgeBase`] trait. The gateway
//! ships an HTTP implementation that posts the query to a retrieval service,
//! and an empty one for deployments without a knowledge base.

use std::sync::Arc;

use bometa_core::{Tool, ToolError, ToolResult};
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_LIMIT: usize = 4;

/// One retrieved passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Retrieval backend for bot knowledge.
#[async_trait::async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Return up to `limit` passages of `bot_id`'s knowledge relevant to `query`.
    async fn search(
        &self,
        bot_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeChunk>, ToolError>;
}

/// A knowledge base that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyKnowledgeBase;

#[async_trait::async_trait]
impl KnowledgeBase for EmptyKnowledgeBase {
    async fn search(
        &self,
        _bot_id: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<KnowledgeChunk>, ToolError> {
        Ok(Vec::new())
    }
}

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    bot_id: &'a str,
    query: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    chunks: Vec<KnowledgeChunk>,
}

/// Knowledge base served by a retrieval endpoint.
///
/// Posts `{"bot_id", "query", "limit"}` and expects `{"chunks": [...]}` back.
#[derive(Debug, Clone)]
pub struct HttpKnowledgeBase {
    http: Client,
    endpoint: Url,
}

impl HttpKnowledgeBase {
    pub fn new(endpoint: &str) -> Result<Self, ToolError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ToolError::Custom(format!("Invalid knowledge endpoint '{}': {}", endpoint, e))
        })?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }
}

#[async_trait::async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn search(
        &self,
        bot_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeChunk>, ToolError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&RetrievalRequest {
                bot_id,
                query,
                limit,
            })
            .send()
            .await
            .map_err(|e| ToolError::Upstream(format!("Knowledge lookup failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolError::Upstream(format!(
                "Knowledge service returned {}",
                response.status().as_u16()
            )));
        }

        let body: RetrievalResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Upstream(format!("Invalid knowledge response: {}", e)))?;

        let mut chunks = body.chunks;
        chunks.truncate(limit);
        Ok(chunks)
    }
}

/// Input for a knowledge lookup
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchKnowledgeInput {
    /// What to look up, phrased as a question or keywords
    pub query: String,
}

/// Tool that searches the knowledge of the bot serving the conversation
pub struct SearchKnowledgeTool {
    bot_id: Option<String>,
    knowledge: Arc<dyn KnowledgeBase>,
}

impl SearchKnowledgeTool {
    pub fn new(bot_id: Option<String>, knowledge: Arc<dyn KnowledgeBase>) -> Self {
        Self { bot_id, knowledge }
    }
}

impl Tool for SearchKnowledgeTool {
    type Input = SearchKnowledgeInput;

    fn name(&self) -> &str {
        "search_knowledge"
    }

    fn description(&self) -> &str {
        "Search this bot's knowledge base (documentation, FAQs, past answers). Try this before \
         answering project-specific questions."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let bot_id = self
            .bot_id
            .as_deref()
            .ok_or_else(|| ToolError::Custom("No bot is bound to this conversation".to_string()))?;

        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::Custom("query must not be empty".to_string()));
        }

        let chunks = self.knowledge.search(bot_id, query, DEFAULT_LIMIT).await?;
        tracing::debug!(bot_id, hits = chunks.len(), "knowledge lookup");

        if chunks.is_empty() {
            return Ok("No relevant knowledge found.".into());
        }
        Ok(ToolResult::json(chunks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedKnowledge;

    #[async_trait::async_trait]
    impl KnowledgeBase for FixedKnowledge {
        async fn search(
            &self,
            bot_id: &str,
            query: &str,
            _limit: usize,
        ) -> Result<Vec<KnowledgeChunk>, ToolError> {
            Ok(vec![KnowledgeChunk {
                content: format!("{} knows about {}", bot_id, query),
                source: None,
                score: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_lookup_is_bound_to_bot() {
        let tool = SearchKnowledgeTool::new(Some("bot-7".to_string()), Arc::new(FixedKnowledge));
        let result = tool
            .execute(SearchKnowledgeInput {
                query: "theming".to_string(),
            })
            .await
            .unwrap();

        assert!(result.as_text().contains("bot-7 knows about theming"));
    }

    #[tokio::test]
    async fn test_lookup_without_bot_fails() {
        let tool = SearchKnowledgeTool::new(None, Arc::new(FixedKnowledge));
        let err = tool
            .execute(SearchKnowledgeInput {
                query: "theming".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No bot"));
    }

    #[tokio::test]
    async fn test_empty_knowledge_base() {
        let tool = SearchKnowledgeTool::new(Some("bot".to_string()), Arc::new(EmptyKnowledgeBase));
        let result = tool
            .execute(SearchKnowledgeInput {
                query: "anything".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.as_text(), "No relevant knowledge found.");
    }

    #[tokio::test]
    async fn test_http_knowledge_base() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .and(body_json(json!({"bot_id": "bot-1", "query": "dark mode", "limit": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chunks": [
                    {"content": "Use ConfigProvider with darkAlgorithm", "source": "docs/theme.md", "score": 0.91},
                    {"content": "extra"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let kb = HttpKnowledgeBase::new(&format!("{}/retrieve", server.uri())).unwrap();
        let chunks = kb.search("bot-1", "dark mode", 1).await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source.as_deref(), Some("docs/theme.md"));
    }

    #[tokio::test]
    async fn test_http_knowledge_base_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let kb = HttpKnowledgeBase::new(&server.uri()).unwrap();
        let err = kb.search("bot-1", "q", 4).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
