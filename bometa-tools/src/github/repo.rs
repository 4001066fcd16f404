use crate::prelude::*;

use super::{clamp_results, GitHubClient, SearchPage};

/// Input for searching repositories
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchRepoInput {
    /// Repository name, topic or keywords
    pub query: String,
    /// Maximum number of repositories to return (default: 5, max: 30)
    #[serde(default)]
    pub max_num: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    full_name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct RepoSummary {
    full_name: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    stars: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl From<ApiRepo> for RepoSummary {
    fn from(repo: ApiRepo) -> Self {
        Self {
            full_name: repo.full_name,
            url: repo.html_url,
            description: repo.description,
            stars: repo.stargazers_count,
            language: repo.language,
        }
    }
}

/// Tool for finding repositories by name or topic, most starred first
pub struct SearchRepoTool {
    client: GitHubClient,
}

impl SearchRepoTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for SearchRepoTool {
    type Input = SearchRepoInput;

    fn name(&self) -> &str {
        "search_repo"
    }

    fn description(&self) -> &str {
        "Search GitHub repositories by name, topic or keywords and return basic repository \
         information, most starred first."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::Custom("query must not be empty".to_string()));
        }
        let limit = clamp_results(input.max_num);

        let page: SearchPage<ApiRepo> = self
            .client
            .get_json(
                "search/repositories",
                &[
                    ("q", query.to_string()),
                    ("sort", "stars".to_string()),
                    ("per_page", limit.to_string()),
                ],
            )
            .await?;

        let repos: Vec<RepoSummary> = page
            .items
            .into_iter()
            .take(limit)
            .map(RepoSummary::from)
            .collect();
        Ok(ToolResult::json(repos)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_repo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .and(query_param("q", "ant design"))
            .and(query_param("sort", "stars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "items": [{
                    "full_name": "ant-design/ant-design",
                    "html_url": "https://github.com/ant-design/ant-design",
                    "description": "An enterprise-class UI design language",
                    "stargazers_count": 90000,
                    "language": "TypeScript"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = SearchRepoTool::new(GitHubClient::new(&server.uri()).unwrap());
        let result = tool
            .execute(SearchRepoInput {
                query: " ant design ".to_string(),
                max_num: None,
            })
            .await
            .unwrap();

        let ToolResult::Json(value) = result else {
            panic!("expected JSON result");
        };
        assert_eq!(value[0]["full_name"], "ant-design/ant-design");
        assert_eq!(value[0]["stars"], 90000);
    }

    #[tokio::test]
    async fn test_search_repo_empty_query() {
        let tool = SearchRepoTool::new(GitHubClient::new("http://127.0.0.1:9").unwrap());
        let result = tool
            .execute(SearchRepoInput {
                query: "   ".to_string(),
                max_num: None,
            })
            .await;
        assert!(result.is_err());
    }
}
