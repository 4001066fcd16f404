//! Gateway server with the question answering tools.
//!
//! Run with:
//! ```sh
//! ANTHROPIC_API_KEY=... GITHUB_TOKEN=... \
//!   cargo run -p bometa-server --example gateway_server
//! ```
//!
//! `BOMETA_CONFIG` points at an optional JSON config file. `PORT` overrides
//! the listening port.
//!
//! Try it as an anonymous client:
//! ```sh
//! curl -X POST http://localhost:8080/api/chat/stream_qa \
//!   -H "Content-Type: application/json" \
//!   -H "x-auth-subject: client|demo" \
//!   -d '{"messages": [{"role": "user", "content": "How do I theme a Button?"}]}' \
//!   -N
//! ```
//! (with `"trusted_subject_header": "x-auth-subject"` in the config).

use anyhow::Context;
use bometa_core::{AnthropicProvider, ModelSpec};
use bometa_server::{GatewayConfig, GatewayRouter};
use bometa_tools::{HttpKnowledgeBase, QaToolsFactory};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bometa_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("BOMETA_CONFIG") {
        Ok(path) => GatewayConfig::load(&path)
            .await
            .with_context(|| format!("loading {path}"))?,
        Err(_) => {
            let mut config = GatewayConfig::default();
            config.apply_env()?;
            config
        }
    };

    let provider = AnthropicProvider::from_env(ModelSpec::from_id(&config.model))?;

    let mut tools = QaToolsFactory::new(&config.github_api_url)?;
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        tools = tools.with_service_token(token);
    }
    if let Some(url) = &config.knowledge_url {
        tools = tools.with_knowledge_base(HttpKnowledgeBase::new(url)?);
    }

    let app = GatewayRouter::from_config(&config)?
        .provider(provider)
        .tools(tools)
        .build()?;

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "bometa gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}
