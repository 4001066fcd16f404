//! Gateway configuration.
//!
//! Loaded once at startup from a JSON file. String values may reference the
//! environment with `${VAR}` or `${VAR:-default}`; `PORT` overrides the port
//! of the bind address. Secrets stay in the environment.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::auth::{
    RoutePolicy, ANONYMOUS_MARKER, DEFAULT_ANONYMOUS_PATHS, DEFAULT_BYPASS_PREFIX,
    DEFAULT_PUBLIC_PATHS,
};
use crate::error::ConfigError;

/// Repository the default assistant prompt is written for.
pub const DEFAULT_REPOSITORY: &str = "ant-design";

/// System prompt for a bot that answers questions about `repo`.
pub fn repository_prompt(repo: &str) -> String {
    format!(
        "You are a question answering assistant for the GitHub repository {repo}. \
         Answer questions about its usage, source code, issues and pull requests. \
         Use the available tools to look things up instead of guessing, cite the \
         files or issues you relied on, and say so when you cannot find an answer. \
         Reply in the language of the question."
    )
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub policy: PolicyConfig,
    /// Repository named in the default prompt.
    pub repository: String,
    /// Overrides the default repository prompt.
    pub system_prompt: Option<String>,
    /// Per-bot settings keyed by bot id.
    pub bots: BTreeMap<String, BotConfig>,
    /// Model id passed to the provider.
    pub model: String,
    pub github_api_url: String,
    /// Retrieval endpoint backing `search_knowledge`.
    pub knowledge_url: Option<String>,
    pub cors_allow_any: bool,
    /// Header asserting the caller's subject, set by a fronting auth proxy.
    pub trusted_subject_header: Option<String>,
    /// Header carrying the caller's GitHub token alongside the subject header.
    pub trusted_token_header: Option<String>,
    /// Model calls allowed per chat request.
    pub max_iterations: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            policy: PolicyConfig::default(),
            repository: DEFAULT_REPOSITORY.to_string(),
            system_prompt: None,
            bots: BTreeMap::new(),
            model: bometa_core::ModelSpec::default_chat().id,
            github_api_url: bometa_tools::github::DEFAULT_API_URL.to_string(),
            knowledge_url: None,
            cors_allow_any: true,
            trusted_subject_header: None,
            trusted_token_header: None,
            max_iterations: bometa_core::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Per-bot settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub prompt: Option<String>,
}

/// Route policy as written in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub public_paths: Vec<String>,
    pub anonymous_paths: Vec<String>,
    /// Plain string prefix, so `/api/auth` also covers `/api/authorize`.
    /// Empty disables the bypass.
    pub bypass_prefix: String,
    pub anonymous_marker: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            anonymous_paths: DEFAULT_ANONYMOUS_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            bypass_prefix: DEFAULT_BYPASS_PREFIX.to_string(),
            anonymous_marker: ANONYMOUS_MARKER.to_string(),
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> RoutePolicy {
        RoutePolicy::builder()
            .public_paths(self.public_paths.iter().cloned())
            .anonymous_paths(self.anonymous_paths.iter().cloned())
            .bypass_prefix(self.bypass_prefix.clone())
            .anonymous_marker(self.anonymous_marker.clone())
            .build()
    }
}

impl GatewayConfig {
    /// Load a config file and apply environment overrides.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut config = Self::from_json_str(&content)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse JSON after expanding environment references.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content);
        Ok(serde_json::from_str(&expanded)?)
    }

    /// Apply `PORT` from the environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.override_port(std::env::var("PORT").ok().as_deref())
    }

    pub fn override_port(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::InvalidBind(format!("PORT={port}")))?;
            self.bind.set_port(port);
        }
        Ok(())
    }

    /// Prompt used when a request names no configured bot.
    pub fn base_prompt(&self) -> String {
        self.system_prompt
            .clone()
            .unwrap_or_else(|| repository_prompt(&self.repository))
    }

    /// Bots that carry their own prompt.
    pub fn bot_prompts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bots
            .iter()
            .filter_map(|(id, bot)| bot.prompt.as_deref().map(|p| (id.as_str(), p)))
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
///
/// Unset variables without a default expand to the empty string. A `$` not
/// followed by `{` is kept as is.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut name = String::new();
        let mut default = None;

        while let Some(next) = chars.next() {
            match next {
                '}' => break,
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let mut value = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        value.push(c);
                    }
                    default = Some(value);
                    break;
                }
                c => name.push(c),
            }
        }

        match std::env::var(&name) {
            Ok(value) => result.push_str(&value),
            Err(_) => result.push_str(default.as_deref().unwrap_or_default()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessTier;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8080");
        assert!(config.cors_allow_any);
        assert_eq!(config.policy.to_policy(), RoutePolicy::default());
        assert!(config.base_prompt().contains("ant-design"));
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = GatewayConfig::from_json_str("{}").unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.policy.public_paths.len(), 6);
    }

    #[test]
    fn test_policy_from_json() {
        let config = GatewayConfig::from_json_str(
            r#"{
                "policy": {
                    "public_paths": ["/status"],
                    "anonymous_paths": ["/api/chat/qa"],
                    "bypass_prefix": ""
                }
            }"#,
        )
        .unwrap();

        let policy = config.policy.to_policy();
        assert_eq!(policy.tier("/status"), AccessTier::Public);
        assert_eq!(policy.tier("/api/health_checker"), AccessTier::Authenticated);
        assert_eq!(policy.tier("/api/auth/login"), AccessTier::Authenticated);
        assert_eq!(policy.anonymous_marker(), "client|");
    }

    #[test]
    fn test_bots_and_prompts() {
        let config = GatewayConfig::from_json_str(
            r#"{
                "repository": "umijs/umi",
                "bots": {
                    "docs": {"prompt": "You answer docs questions."},
                    "plain": {}
                }
            }"#,
        )
        .unwrap();

        assert!(config.base_prompt().contains("umijs/umi"));
        assert_eq!(
            config.bot_prompts().collect::<Vec<_>>(),
            vec![("docs", "You answer docs questions.")]
        );
    }

    #[test]
    fn test_system_prompt_overrides_repository_prompt() {
        let config =
            GatewayConfig::from_json_str(r#"{"system_prompt": "Be brief."}"#).unwrap();
        assert_eq!(config.base_prompt(), "Be brief.");
    }

    #[test]
    fn test_override_port() {
        let mut config = GatewayConfig::default();
        config.override_port(Some("3000")).unwrap();
        assert_eq!(config.bind.port(), 3000);

        config.override_port(None).unwrap();
        config.override_port(Some("")).unwrap();
        assert_eq!(config.bind.port(), 3000);

        assert!(matches!(
            config.override_port(Some("http")),
            Err(ConfigError::InvalidBind(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GatewayConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            GatewayConfig::from_json_str(r#"{"bind": "not an address"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("BOMETA_TEST_EXPAND_URL", "http://kb.local");
        assert_eq!(
            expand_env_vars(r#"{"knowledge_url": "${BOMETA_TEST_EXPAND_URL}"}"#),
            r#"{"knowledge_url": "http://kb.local"}"#
        );
    }

    #[test]
    fn test_expand_env_vars_defaults() {
        std::env::remove_var("BOMETA_TEST_EXPAND_UNSET");
        assert_eq!(
            expand_env_vars("${BOMETA_TEST_EXPAND_UNSET:-ant-design}"),
            "ant-design"
        );
        assert_eq!(expand_env_vars("a${BOMETA_TEST_EXPAND_UNSET}b"), "ab");
        assert_eq!(expand_env_vars("${BOMETA_TEST_EXPAND_UNSET:-}"), "");
    }

    #[test]
    fn test_expand_env_vars_leaves_plain_dollars() {
        assert_eq!(expand_env_vars("cost: $5"), "cost: $5");
        assert_eq!(expand_env_vars("$"), "$");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = GatewayConfig::load("/nonexistent/bometa.json").await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
