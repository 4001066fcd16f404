//! Error types for the bometa gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::DenyReason;

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No model provider was configured.
    #[error("No model provider configured. Call .provider() before .build()")]
    NoProvider,
}

/// Errors that can occur while loading the gateway configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bind address: {0}")]
    InvalidBind(String),

    #[error("Invalid header name: {0}")]
    InvalidHeader(String),
}

/// Errors returned by the gateway's HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The route needs an identity and the request carries none.
    #[error("Unauthorized")]
    Unauthenticated,

    /// An anonymous client asked for a route reserved for registered users.
    #[error("Anonymous User Not Allow")]
    AnonymousForbidden,

    /// Error from the agent during execution.
    #[error("Agent error: {0}")]
    Agent(#[from] bometa_core::AgentError),

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::AnonymousForbidden => StatusCode::FORBIDDEN,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DenyReason> for ServerError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => ServerError::Unauthenticated,
            DenyReason::AnonymousForbidden => ServerError::AnonymousForbidden,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::InvalidRequest(e) => e.clone(),
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
