//! Per-request session state.
//!
//! The host's session layer (cookie store, proxy headers, ...) installs a
//! [`Session`] as a request extension before the access gate runs. The gateway
//! only reads it. A `user` entry of the form `{"sub": "..."}` identifies the
//! caller.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderName;
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session key holding the user record.
pub const USER_KEY: &str = "user";

/// Session key holding the caller's GitHub token, if the auth flow stored one.
pub const GITHUB_TOKEN_KEY: &str = "github_token";

/// Session values for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Map<String, Value>);

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// A session whose user record carries `subject`.
    pub fn for_subject(subject: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.insert(USER_KEY, serde_json::json!({ "sub": subject.into() }));
        session
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// The raw user record, if any.
    pub fn user(&self) -> Option<&Value> {
        self.get(USER_KEY)
    }

    pub fn github_token(&self) -> Option<&str> {
        self.get(GITHUB_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Produces a session for requests that arrive without one.
pub trait SessionSource: Send + Sync {
    fn load(&self, request: &Request) -> Option<Session>;
}

/// Session asserted by a fronting authentication proxy through a header.
///
/// Only deploy this behind a proxy that strips the header from client
/// requests.
#[derive(Debug, Clone)]
pub struct TrustedHeaderSession {
    subject_header: HeaderName,
    token_header: Option<HeaderName>,
}

impl TrustedHeaderSession {
    pub fn new(subject_header: HeaderName) -> Self {
        Self {
            subject_header,
            token_header: None,
        }
    }

    /// Also read the caller's GitHub token from `header`.
    pub fn with_token_header(mut self, header: HeaderName) -> Self {
        self.token_header = Some(header);
        self
    }
}

impl SessionSource for TrustedHeaderSession {
    fn load(&self, request: &Request) -> Option<Session> {
        let headers = request.headers();
        let subject = headers
            .get(&self.subject_header)?
            .to_str()
            .ok()?
            .trim();
        if subject.is_empty() {
            return None;
        }

        let mut session = Session::for_subject(subject);
        if let Some(token) = self
            .token_header
            .as_ref()
            .and_then(|h| headers.get(h))
            .and_then(|v| v.to_str().ok())
        {
            session.insert(GITHUB_TOKEN_KEY, Value::String(token.to_string()));
        }
        Some(session)
    }
}

/// Middleware installing a [`Session`] from `source` unless one is present.
pub async fn load_session(
    State(source): State<Arc<dyn SessionSource>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<Session>().is_none() {
        if let Some(session) = source.load(&request) {
            request.extensions_mut().insert(session);
        }
    }
    next.run(request).await
}
