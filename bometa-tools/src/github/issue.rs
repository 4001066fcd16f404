use crate::prelude::*;

use super::{clamp_results, truncate_body, validate_repo, GitHubClient, SearchPage};

/// Issue state filter
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiIssue {
    number: u64,
    title: String,
    state: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// What the model sees for one issue.
#[derive(Debug, Serialize)]
struct IssueSummary {
    number: u64,
    title: String,
    state: String,
    url: String,
    comments: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl From<ApiIssue> for IssueSummary {
    fn from(issue: ApiIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            state: issue.state,
            url: issue.html_url,
            comments: issue.comments,
            body: issue
                .body
                .filter(|b| !b.trim().is_empty())
                .map(|b| truncate_body(&b)),
        }
    }
}

// ===== create_issue =====

/// Input for opening an issue
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Issue title
    pub title: String,
    /// Issue body in Markdown
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// Tool for opening a new issue on the user's behalf
pub struct CreateIssueTool {
    client: GitHubClient,
}

impl CreateIssueTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for CreateIssueTool {
    type Input = CreateIssueInput;

    fn name(&self) -> &str {
        "create_issue"
    }

    fn description(&self) -> &str {
        "Create a new issue in a GitHub repository. Only use this when the user explicitly \
         asks to file an issue."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        if input.title.trim().is_empty() {
            return Err(ToolError::Custom("Issue title must not be empty".to_string()));
        }

        let created: ApiIssue = self
            .client
            .post_json(
                &format!("repos/{}/issues", repo),
                &CreateIssueRequest {
                    title: input.title.trim(),
                    body: input.body.as_deref(),
                },
            )
            .await?;

        Ok(ToolResult::json(IssueSummary::from(created))?)
    }
}

// ===== get_issues =====

/// Input for listing issues
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetIssuesInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Which issues to list (default: open)
    #[serde(default)]
    pub state: IssueState,
    /// Maximum number of issues to return (default: 5, max: 30)
    #[serde(default)]
    pub max_num: Option<usize>,
}

/// Tool for listing the most recently updated issues of a repository
pub struct GetIssuesTool {
    client: GitHubClient,
}

impl GetIssuesTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for GetIssuesTool {
    type Input = GetIssuesInput;

    fn name(&self) -> &str {
        "get_issues"
    }

    fn description(&self) -> &str {
        "List the most recently updated issues of a GitHub repository. Pull requests are excluded."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        let limit = clamp_results(input.max_num);

        let issues: Vec<ApiIssue> = self
            .client
            .get_json(
                &format!("repos/{}/issues", repo),
                &[
                    ("state", input.state.as_str().to_string()),
                    ("sort", "updated".to_string()),
                    ("per_page", limit.to_string()),
                ],
            )
            .await?;

        // The issues endpoint also returns pull requests
        let summaries: Vec<IssueSummary> = issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .take(limit)
            .map(IssueSummary::from)
            .collect();

        Ok(ToolResult::json(summaries)?)
    }
}

// ===== search_issues =====

/// Input for searching issues
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchIssuesInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Keywords to look for in issue titles and bodies
    pub keyword: String,
    /// Which issues to search (default: open)
    #[serde(default)]
    pub state: IssueState,
    /// Maximum number of issues to return (default: 5, max: 30)
    #[serde(default)]
    pub max_num: Option<usize>,
}

#[derive(Debug, Serialize)]
struct IssueSearchResult {
    total_count: u64,
    items: Vec<IssueSummary>,
}

/// Tool for finding existing issues that match keywords
pub struct SearchIssuesTool {
    client: GitHubClient,
}

impl SearchIssuesTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

fn issue_query(repo: &str, keyword: &str, state: IssueState) -> String {
    let mut query = format!("{} repo:{} is:issue", keyword.trim(), repo);
    if state != IssueState::All {
        query.push_str(&format!(" state:{}", state.as_str()));
    }
    query
}

impl Tool for SearchIssuesTool {
    type Input = SearchIssuesInput;

    fn name(&self) -> &str {
        "search_issues"
    }

    fn description(&self) -> &str {
        "Search the issues of a GitHub repository by keyword. Use this to find out whether a \
         problem has already been reported."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        if input.keyword.trim().is_empty() {
            return Err(ToolError::Custom("keyword must not be empty".to_string()));
        }
        let limit = clamp_results(input.max_num);

        let page: SearchPage<ApiIssue> = self
            .client
            .get_json(
                "search/issues",
                &[
                    ("q", issue_query(repo, &input.keyword, input.state)),
                    ("per_page", limit.to_string()),
                ],
            )
            .await?;

        Ok(ToolResult::json(IssueSearchResult {
            total_count: page.total_count,
            items: page
                .items
                .into_iter()
                .take(limit)
                .map(IssueSummary::from)
                .collect(),
        })?)
    }
}
