//! Access-controlled HTTP gateway for bometa chat bots.
//!
//! Every request passes an access gate before it reaches a handler. The gate
//! resolves the caller's [`Identity`] from the request [`Session`] and checks
//! it against a [`RoutePolicy`]:
//!
//! - paths under the bypass prefix (`/api/auth`) and public paths are open,
//! - requests without an identity get `401 Unauthorized`,
//! - anonymous clients (subjects starting with `client|`) may only reach the
//!   chat endpoints and get `403` elsewhere,
//! - registered users may reach everything.
//!
//! Behind the gate, [`GatewayRouter`] serves a health check and the question
//! answering endpoints, backed by a `bometa-core` agent.
//!
//! # Example
//!
//! ```rust,no_run
//! use bometa_server::{GatewayConfig, GatewayRouter};
//! use bometa_core::{AnthropicProvider, ModelSpec};
//! use bometa_tools::QaToolsFactory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::load("bometa.json").await?;
//!
//! let app = GatewayRouter::from_config(&config)?
//!     .provider(AnthropicProvider::from_env(ModelSpec::from_id(&config.model))?)
//!     .tools(QaToolsFactory::new(&config.github_api_url)?)
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind(config.bind).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The gate is also usable on its own in front of any axum router:
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use bometa_server::auth::{access_gate, AccessGate};
//!
//! let app: Router = Router::new()
//!     .route("/api/bot/list", get(|| async { "[]" }))
//!     .layer(middleware::from_fn_with_state(AccessGate::default(), access_gate));
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod health;
pub mod router;
pub mod session;
pub(crate) mod state;

// Re-exports
pub use auth::{AccessGate, Decision, DenyReason, Identity, RoutePolicy};
pub use config::GatewayConfig;
pub use error::{BuildError, ConfigError, ServerError, ServerResult};
pub use router::GatewayRouter;
pub use session::{Session, SessionSource, TrustedHeaderSession};
