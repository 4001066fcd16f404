//! The authorization gate and its axum middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::identity::Identity;
use super::policy::{AccessTier, RoutePolicy};
use crate::error::ServerError;
use crate::session::Session;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No identity on a path that needs one.
    Unauthenticated,
    /// An anonymous client on a path reserved for registered users.
    AnonymousForbidden,
}

impl DenyReason {
    pub fn status(self) -> StatusCode {
        match self {
            DenyReason::Unauthenticated => StatusCode::UNAUTHORIZED,
            DenyReason::AnonymousForbidden => StatusCode::FORBIDDEN,
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Decides whether an identity may reach a path.
///
/// Holds no mutable state; clones share one policy.
#[derive(Debug, Clone)]
pub struct AccessGate {
    policy: Arc<RoutePolicy>,
}

impl AccessGate {
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Resolve the caller using this gate's anonymous marker.
    pub fn identify(&self, session: Option<&Session>) -> Identity {
        Identity::resolve_with_marker(session, self.policy.anonymous_marker())
    }

    pub fn evaluate(&self, identity: &Identity, path: &str) -> Decision {
        let tier = self.policy.tier(path);
        match (tier, identity) {
            (AccessTier::Bypass | AccessTier::Public, _) => Decision::Allow,
            // Absent is settled before any subject is looked at
            (_, Identity::Absent) => Decision::Deny(DenyReason::Unauthenticated),
            (AccessTier::Anonymous, Identity::Anonymous { .. }) => Decision::Allow,
            (AccessTier::Authenticated, Identity::Anonymous { .. }) => {
                Decision::Deny(DenyReason::AnonymousForbidden)
            }
            (_, Identity::Authenticated { .. }) => Decision::Allow,
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(RoutePolicy::default())
    }
}

/// Middleware enforcing an [`AccessGate`].
///
/// Reads the [`Session`] extension, rejects with 401 or 403 without calling
/// `next`, or inserts the resolved [`Identity`] into the request extensions
/// and hands the request on. The downstream response is returned untouched.
///
/// ```ignore
/// let app = Router::new()
///     .route("/api/chat/qa", post(qa))
///     .layer(axum::middleware::from_fn_with_state(AccessGate::default(), access_gate));
/// ```
pub async fn access_gate(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = gate.identify(request.extensions().get::<Session>());
    let decision = gate.evaluate(&identity, request.uri().path());

    tracing::debug!(
        path = %request.uri().path(),
        identity = identity.kind(),
        ?decision,
        "access gate"
    );

    match decision {
        Decision::Allow => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Decision::Deny(reason) => ServerError::from(reason).into_response(),
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
