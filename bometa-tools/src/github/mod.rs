//! GitHub REST API tools.
//!
//! Every tool holds a clone of one [`GitHubClient`], which carries the API
//! base URL and the caller's token (if any). Tools take the target repository
//! as `owner/name` in their input so one toolset can serve any repository a
//! bot is attached to.
//!
//! # Available Tools
//!
//! | Tool | Description |
//! |------|-------------|
//! | [`CreateIssueTool`] | Open an issue |
//! | [`GetIssuesTool`] | List recent issues |
//! | [`SearchIssuesTool`] | Search issues by keyword |
//! | [`GetFileContentTool`] | Read a file at a ref |
//! | [`CreateReviewCommentTool`] | Comment on a pull request diff line |
//! | [`CreatePrSummaryTool`] | Post a summary comment on a pull request |
//! | [`SearchCodeTool`] | Search code in a repository |
//! | [`SearchRepoTool`] | Search repositories |

mod issue;
mod pull_request;
mod repo;
mod source;

pub use issue::{CreateIssueTool, GetIssuesTool, SearchIssuesTool};
pub use pull_request::{CreatePrSummaryTool, CreateReviewCommentTool, GetFileContentTool};
pub use repo::SearchRepoTool;
pub use source::SearchCodeTool;

use bometa_core::ToolError;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const USER_AGENT_VALUE: &str = "bometa-gateway";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// Longest issue or file body handed back to the model, in characters.
pub(crate) const MAX_BODY_CHARS: usize = 4000;

/// Default and upper bound for list and search results.
pub(crate) const DEFAULT_MAX_RESULTS: usize = 5;
pub(crate) const MAX_RESULTS: usize = 30;

/// Thin GitHub REST client shared by the GitHub tools.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubClient {
    /// Create a client for the API at `base_url` (e.g. `https://api.github.com`
    /// or a GitHub Enterprise `https://host/api/v3`).
    pub fn new(base_url: &str) -> Result<Self, ToolError> {
        // Url::join drops the last path segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ToolError::Custom(format!("Invalid GitHub API URL '{}': {}", base_url, e)))?;

        Ok(Self {
            http: Client::new(),
            base_url,
            token: None,
        })
    }

    /// Authenticate requests with a token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Share an existing connection pool.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        accept: &str,
    ) -> Result<RequestBuilder, ToolError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ToolError::Custom(format!("Invalid API path '{}': {}", path, e)))?;

        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ToolError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ToolError::Upstream(format!("GitHub request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        tracing::debug!(status = status.as_u16(), %message, "GitHub API error");

        Err(ToolError::Upstream(format!(
            "GitHub API returned {}: {}",
            status.as_u16(),
            message
        )))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ToolError> {
        let builder = self.request(Method::GET, path, JSON_MEDIA_TYPE)?.query(query);
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ToolError::Upstream(format!("Invalid GitHub response: {}", e)))
    }

    /// Fetch a raw file body instead of the JSON envelope.
    pub(crate) async fn get_raw(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, ToolError> {
        let builder = self.request(Method::GET, path, RAW_MEDIA_TYPE)?.query(query);
        let response = self.send(builder).await?;
        response
            .text()
            .await
            .map_err(|e| ToolError::Upstream(format!("Failed to read file body: {}", e)))
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ToolError> {
        if self.token.is_none() {
            return Err(ToolError::Custom(
                "This action needs a GitHub token; ask the user to sign in with GitHub".to_string(),
            ));
        }

        let builder = self.request(Method::POST, path, JSON_MEDIA_TYPE)?.json(body);
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ToolError::Upstream(format!("Invalid GitHub response: {}", e)))
    }
}

/// Validate an `owner/name` repository reference.
pub(crate) fn validate_repo(repo_name: &str) -> Result<&str, ToolError> {
    let trimmed = repo_name.trim().trim_matches('/');
    match trimmed.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(trimmed)
        }
        _ => Err(ToolError::Custom(format!(
            "repo_name must look like 'owner/name', got '{}'",
            repo_name
        ))),
    }
}

/// Clamp a requested result count.
pub(crate) fn clamp_results(max_num: Option<usize>) -> usize {
    max_num.unwrap_or(DEFAULT_MAX_RESULTS).clamp(1, MAX_RESULTS)
}

/// Cut long text at a char boundary, marking the cut.
pub(crate) fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}\n[truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

/// Common fields of a GitHub search response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}
