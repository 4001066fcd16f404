//! Router builder for the gateway.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    http::{HeaderName, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bometa_core::{ModelProvider, Toolset, ToolsetFactory, DEFAULT_MAX_ITERATIONS};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{access_gate, AccessGate, RoutePolicy};
use crate::chat::{qa, stream_qa};
use crate::config::{repository_prompt, GatewayConfig, DEFAULT_REPOSITORY};
use crate::error::{BuildError, ConfigError};
use crate::health::health_checker;
use crate::session::{load_session, SessionSource, TrustedHeaderSession};
use crate::state::{AppState, Prompts};

pub const HEALTH_PATH: &str = "/api/health_checker";
pub const QA_PATH: &str = "/api/chat/qa";
pub const STREAM_QA_PATH: &str = "/api/chat/stream_qa";

/// Builder for the gateway's HTTP surface.
///
/// Every route, including routes merged in with [`merge`](Self::merge) and
/// the 404 fallback, sits behind the access gate.
///
/// # Example
///
/// ```rust,no_run
/// use bometa_server::GatewayRouter;
/// use bometa_core::{AnthropicProvider, ModelSpec};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = GatewayRouter::new()
///     .provider(AnthropicProvider::from_env(ModelSpec::default_chat())?)
///     .build()?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct GatewayRouter {
    provider: Option<Arc<dyn ModelProvider>>,
    tools: Arc<dyn ToolsetFactory>,
    policy: RoutePolicy,
    base_prompt: String,
    bot_prompts: BTreeMap<String, String>,
    max_iterations: usize,
    routes: Router,
    session_source: Option<Arc<dyn SessionSource>>,
    cors: Option<CorsLayer>,
}

impl Default for GatewayRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayRouter {
    /// A builder with the default policy and prompt, no tools and no
    /// provider.
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(Toolset::new()),
            policy: RoutePolicy::default(),
            base_prompt: repository_prompt(DEFAULT_REPOSITORY),
            bot_prompts: BTreeMap::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            routes: Router::new(),
            session_source: None,
            cors: None,
        }
    }

    /// Apply policy, prompts, CORS and session settings from `config`.
    ///
    /// The provider and tools are still up to the caller.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let mut router = Self::new()
            .policy(config.policy.to_policy())
            .system_prompt(config.base_prompt())
            .max_iterations(config.max_iterations);

        for (bot_id, prompt) in config.bot_prompts() {
            router = router.bot_prompt(bot_id, prompt);
        }
        if config.cors_allow_any {
            router = router.cors(CorsLayer::very_permissive());
        }
        if let Some(header) = &config.trusted_subject_header {
            let mut source = TrustedHeaderSession::new(parse_header(header)?);
            if let Some(token_header) = &config.trusted_token_header {
                source = source.with_token_header(parse_header(token_header)?);
            }
            router = router.session_source(source);
        }
        Ok(router)
    }

    pub fn provider(self, provider: impl ModelProvider + 'static) -> Self {
        self.shared_provider(Arc::new(provider))
    }

    pub fn shared_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Tools offered to the agent on each chat request.
    pub fn tools(mut self, tools: impl ToolsetFactory + 'static) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    pub fn policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Prompt for requests that name no configured bot.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.base_prompt = prompt.into();
        self
    }

    pub fn bot_prompt(mut self, bot_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.bot_prompts.insert(bot_id.into(), prompt.into());
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Serve extra host routes behind the same gate.
    pub fn merge(mut self, routes: Router) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// Install sessions from `source` for requests that arrive without one.
    pub fn session_source(mut self, source: impl SessionSource + 'static) -> Self {
        self.session_source = Some(Arc::new(source));
        self
    }

    pub fn cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Build the router.
    ///
    /// Layers from the outside in: request tracing, CORS, session loading,
    /// the access gate, then the routes.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoProvider`] if no provider was configured.
    pub fn build(self) -> Result<Router, BuildError> {
        let provider = self.provider.ok_or(BuildError::NoProvider)?;

        let state = AppState {
            provider,
            tools: self.tools,
            prompts: Arc::new(Prompts {
                base: self.base_prompt,
                bots: self.bot_prompts,
            }),
            max_iterations: self.max_iterations,
        };

        let mut router = Router::new()
            .route(HEALTH_PATH, get(health_checker))
            .route(QA_PATH, post(qa))
            .route(STREAM_QA_PATH, post(stream_qa))
            .with_state(state)
            .merge(self.routes)
            .fallback(not_found)
            .layer(from_fn_with_state(AccessGate::new(self.policy), access_gate));

        if let Some(source) = self.session_source {
            router = router.layer(from_fn_with_state(source, load_session));
        }
        if let Some(cors) = self.cors {
            router = router.layer(cors);
        }

        Ok(router.layer(TraceLayer::new_for_http()))
    }
}

fn parse_header(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::try_from(name)
        .map_err(|_| ConfigError::InvalidHeader(name.to_string()))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not Found", "code": 404})),
    )
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
