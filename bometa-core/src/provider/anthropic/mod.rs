//! Anthropic direct API provider implementation

mod conversion;

use std::time::Duration;

use conversion::{
    from_anthropic_content, from_anthropic_stop_reason, from_anthropic_usage,
    to_anthropic_message, to_anthropic_tool, ErrorEnvelope, MessageCreateParams, MessageResponse,
};
use reqwest::StatusCode;

use super::{ModelProvider, ProviderError};
use crate::model::{ModelResponse, ModelSpec};
use crate::types::{Message, Role, ToolDefinition};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default maximum tokens to generate
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ===== Error Classification =====

fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| format!("{}: {}", e.error.kind, e.error.message))
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Authentication(message)
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => ProviderError::Configuration(message),
        s if s.as_u16() == 529 || s.is_server_error() => {
            ProviderError::ServiceUnavailable(message)
        }
        _ => ProviderError::Other(format!("HTTP {}: {}", status, message)),
    }
}

fn classify_transport(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        ProviderError::Other(format!("Invalid response: {}", err))
    } else {
        ProviderError::Network(err.to_string())
    }
}

// ===== AnthropicProvider =====

/// Anthropic Messages API model provider
///
/// ```ignore
/// use bometa_core::{AnthropicProvider, ModelSpec};
///
/// let provider = AnthropicProvider::from_env(ModelSpec::default_chat())?;
/// ```
#[derive(Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: ModelSpec,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider using `ANTHROPIC_API_KEY`
    pub fn from_env(model: ModelSpec) -> Result<Self, ProviderError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ProviderError::Configuration("ANTHROPIC_API_KEY is not set".to_string())
        })?;
        Self::new(api_key, model)
    }

    /// Create a new Anthropic provider with an explicit API key
    pub fn new(api_key: impl Into<String>, model: ModelSpec) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS.min(model.max_output_tokens as u32),
            model,
        })
    }

    /// Point the provider at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the maximum number of tokens to generate per request
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_params(
        &self,
        messages: &[Message],
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> MessageCreateParams {
        MessageCreateParams {
            model: self.model.id.clone(),
            max_tokens: self.max_tokens,
            messages: messages.iter().map(to_anthropic_message).collect(),
            system: system_prompt,
            tools: tools.into_iter().map(to_anthropic_tool).collect(),
        }
    }
}

#[async_trait::async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.model.name
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        system_prompt: Option<String>,
    ) -> Result<ModelResponse, ProviderError> {
        let params = self.build_params(&messages, tools, system_prompt);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&params)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: MessageResponse = response.json().await.map_err(classify_transport)?;

        Ok(ModelResponse {
            message: Message {
                role: Role::Assistant,
                content: from_anthropic_content(body.content),
            },
            stop_reason: from_anthropic_stop_reason(body.stop_reason.as_deref()),
            usage: from_anthropic_usage(body.usage),
        })
    }
}
