use crate::prelude::*;

use super::{clamp_results, validate_repo, GitHubClient, SearchPage};

/// Input for searching code
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchCodeInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Keywords or identifiers to look for
    pub keyword: String,
    /// Restrict to one language, e.g. "typescript"
    #[serde(default)]
    pub language: Option<String>,
    /// Maximum number of matches to return (default: 5, max: 30)
    #[serde(default)]
    pub max_num: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiCodeItem {
    name: String,
    path: String,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct CodeMatch {
    name: String,
    path: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct CodeSearchResult {
    total_count: u64,
    items: Vec<CodeMatch>,
}

/// Tool for locating source files that mention a keyword
pub struct SearchCodeTool {
    client: GitHubClient,
}

impl SearchCodeTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

fn code_query(repo: &str, keyword: &str, language: Option<&str>) -> String {
    let mut query = format!("{} repo:{}", keyword.trim(), repo);
    if let Some(lang) = language.map(str::trim).filter(|l| !l.is_empty()) {
        query.push_str(&format!(" language:{}", lang));
    }
    query
}

impl Tool for SearchCodeTool {
    type Input = SearchCodeInput;

    fn name(&self) -> &str {
        "search_code"
    }

    fn description(&self) -> &str {
        "Search the source code of a GitHub repository. Returns matching file paths; read a \
         file with get_file_content."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        if input.keyword.trim().is_empty() {
            return Err(ToolError::Custom("keyword must not be empty".to_string()));
        }
        let limit = clamp_results(input.max_num);

        let page: SearchPage<ApiCodeItem> = self
            .client
            .get_json(
                "search/code",
                &[
                    ("q", code_query(repo, &input.keyword, input.language.as_deref())),
                    ("per_page", limit.to_string()),
                ],
            )
            .await?;

        Ok(ToolResult::json(CodeSearchResult {
            total_count: page.total_count,
            items: page
                .items
                .into_iter()
                .take(limit)
                .map(|item| CodeMatch {
                    name: item.name,
                    path: item.path,
                    url: item.html_url,
                })
                .collect(),
        })?)
    }
}
