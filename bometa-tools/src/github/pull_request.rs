use crate::prelude::*;

use super::{truncate_body, validate_repo, GitHubClient};

/// Response to any comment creation
#[derive(Debug, Deserialize, Serialize)]
struct CreatedComment {
    id: u64,
    html_url: String,
}

// ===== get_file_content =====

/// Input for reading one file
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFileContentInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Path of the file inside the repository
    pub path: String,
    /// Branch, tag or commit SHA (default: the repository's default branch)
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

/// Tool for reading a file from a repository, typically one touched by a pull request
pub struct GetFileContentTool {
    client: GitHubClient,
}

impl GetFileContentTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for GetFileContentTool {
    type Input = GetFileContentInput;

    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Read the content of a file in a GitHub repository at an optional branch, tag or commit."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        let file_path = input.path.trim().trim_start_matches('/');
        if file_path.is_empty() || file_path.split('/').any(|seg| seg == "..") {
            return Err(ToolError::Custom(format!("Invalid file path '{}'", input.path)));
        }

        let query: Vec<(&str, String)> = input
            .git_ref
            .iter()
            .map(|r| ("ref", r.clone()))
            .collect();

        let content = self
            .client
            .get_raw(&format!("repos/{}/contents/{}", repo, file_path), &query)
            .await?;

        let location = match &input.git_ref {
            Some(r) => format!("{}@{}", file_path, r),
            None => file_path.to_string(),
        };
        Ok(format!("File: {}\n\n{}", location, truncate_body(&content)).into())
    }
}

// ===== create_review_comment =====

/// Input for commenting on a diff line
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateReviewCommentInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Pull request number
    pub pull_number: u64,
    /// SHA of the commit being reviewed
    pub commit_id: String,
    /// Path of the file being commented on
    pub path: String,
    /// Line in the new version of the file
    pub line: u64,
    /// Comment text in Markdown
    pub body: String,
}

#[derive(Serialize)]
struct ReviewCommentRequest<'a> {
    body: &'a str,
    commit_id: &'a str,
    path: &'a str,
    line: u64,
    side: &'static str,
}

/// Tool for leaving a review comment on a line of a pull request diff
pub struct CreateReviewCommentTool {
    client: GitHubClient,
}

impl CreateReviewCommentTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for CreateReviewCommentTool {
    type Input = CreateReviewCommentInput;

    fn name(&self) -> &str {
        "create_review_comment"
    }

    fn description(&self) -> &str {
        "Leave a review comment on a specific line of a pull request diff."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        if input.body.trim().is_empty() {
            return Err(ToolError::Custom("Comment body must not be empty".to_string()));
        }

        let created: CreatedComment = self
            .client
            .post_json(
                &format!("repos/{}/pulls/{}/comments", repo, input.pull_number),
                &ReviewCommentRequest {
                    body: &input.body,
                    commit_id: &input.commit_id,
                    path: &input.path,
                    line: input.line,
                    side: "RIGHT",
                },
            )
            .await?;

        Ok(ToolResult::json(created)?)
    }
}

// ===== create_pr_summary =====

/// Input for posting a pull request summary
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePrSummaryInput {
    /// Repository as "owner/name"
    pub repo_name: String,
    /// Pull request number
    pub pull_number: u64,
    /// Summary in Markdown
    pub summary: String,
}

#[derive(Serialize)]
struct IssueCommentRequest<'a> {
    body: &'a str,
}

/// Tool for posting a summary of a pull request as a conversation comment
pub struct CreatePrSummaryTool {
    client: GitHubClient,
}

impl CreatePrSummaryTool {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl Tool for CreatePrSummaryTool {
    type Input = CreatePrSummaryInput;

    fn name(&self) -> &str {
        "create_pr_summary"
    }

    fn description(&self) -> &str {
        "Post a summary of a pull request's changes as a comment on the pull request."
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let repo = validate_repo(&input.repo_name)?;
        if input.summary.trim().is_empty() {
            return Err(ToolError::Custom("Summary must not be empty".to_string()));
        }

        // Pull request conversation comments live on the issues endpoint
        let created: CreatedComment = self
            .client
            .post_json(
                &format!("repos/{}/issues/{}/comments", repo, input.pull_number),
                &IssueCommentRequest {
                    body: &input.summary,
                },
            )
            .await?;

        Ok(ToolResult::json(created)?)
    }
}
