//! Tests for gate decisions and the middleware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router};
use tower::ServiceExt;

use super::*;
use crate::auth::policy::{DEFAULT_ANONYMOUS_PATHS, DEFAULT_PUBLIC_PATHS};

fn anonymous() -> Identity {
    Identity::from_subject("client|abc")
}

fn authenticated() -> Identity {
    Identity::from_subject("user|42")
}

fn all_identities() -> [Identity; 3] {
    [Identity::Absent, anonymous(), authenticated()]
}

// ============================================================================
// Decisions
// ============================================================================

#[test]
fn test_bypass_allows_every_identity() {
    let gate = AccessGate::default();
    for path in ["/api/auth", "/api/auth/login", "/api/auth/a/b"] {
        for identity in all_identities() {
            assert_eq!(gate.evaluate(&identity, path), Decision::Allow, "{path} {identity:?}");
        }
    }
}

#[test]
fn test_public_allows_every_identity() {
    let gate = AccessGate::default();
    for path in DEFAULT_PUBLIC_PATHS {
        for identity in all_identities() {
            assert_eq!(gate.evaluate(&identity, path), Decision::Allow, "{path} {identity:?}");
        }
    }
}

#[test]
fn test_absent_is_unauthenticated_elsewhere() {
    let gate = AccessGate::default();
    for path in ["/api/secret/data", "/api/chat/qa", "/api/bot/create", "/"] {
        assert_eq!(
            gate.evaluate(&Identity::Absent, path),
            Decision::Deny(DenyReason::Unauthenticated),
            "{path}"
        );
    }
}

#[test]
fn test_anonymous_limited_to_anonymous_paths() {
    let gate = AccessGate::default();
    for path in DEFAULT_ANONYMOUS_PATHS {
        assert_eq!(gate.evaluate(&anonymous(), path), Decision::Allow);
    }
    for path in ["/api/secret/data", "/api/bot/create", "/api/chat/qa/"] {
        assert_eq!(
            gate.evaluate(&anonymous(), path),
            Decision::Deny(DenyReason::AnonymousForbidden),
            "{path}"
        );
    }
}

#[test]
fn test_authenticated_allowed_everywhere() {
    let gate = AccessGate::default();
    for path in ["/api/secret/data", "/api/chat/qa", "/api/bot/create", "/"] {
        assert_eq!(gate.evaluate(&authenticated(), path), Decision::Allow);
    }
}

#[test]
fn test_scenarios() {
    let gate = AccessGate::default();
    let cases = [
        ("/api/health_checker", Identity::Absent, Decision::Allow),
        ("/api/chat/qa", anonymous(), Decision::Allow),
        ("/api/chat/qa", authenticated(), Decision::Allow),
        (
            "/api/secret/data",
            Identity::Absent,
            Decision::Deny(DenyReason::Unauthenticated),
        ),
        (
            "/api/secret/data",
            anonymous(),
            Decision::Deny(DenyReason::AnonymousForbidden),
        ),
        ("/api/auth/login", Identity::Absent, Decision::Allow),
    ];

    for (path, identity, expected) in cases {
        assert_eq!(gate.evaluate(&identity, path), expected, "{path} {identity:?}");
    }
}

#[test]
fn test_evaluation_is_idempotent() {
    let gate = AccessGate::default();
    for path in ["/api/secret/data", "/api/chat/qa", "/api/auth/x", "/favicon.ico"] {
        for identity in all_identities() {
            let first = gate.evaluate(&identity, path);
            let second = gate.evaluate(&identity, path);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_gates_with_different_policies_coexist() {
    let strict = AccessGate::new(RoutePolicy::builder().build());
    let open = AccessGate::new(
        RoutePolicy::builder()
            .anonymous_path("/api/secret/data")
            .build(),
    );

    assert_eq!(
        strict.evaluate(&anonymous(), "/api/secret/data"),
        Decision::Deny(DenyReason::AnonymousForbidden)
    );
    assert_eq!(open.evaluate(&anonymous(), "/api/secret/data"), Decision::Allow);
}

#[test]
fn test_identify_uses_policy_marker() {
    let gate = AccessGate::new(RoutePolicy::builder().anonymous_marker("guest:").build());
    let session = Session::for_subject("guest:1");
    assert!(gate.identify(Some(&session)).is_anonymous());
    assert!(gate.identify(Some(&Session::for_subject("client|1"))).is_authenticated());
}

#[test]
fn test_deny_reason_status() {
    assert_eq!(DenyReason::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(DenyReason::AnonymousForbidden.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Middleware
// ============================================================================

fn counting_app(calls: Arc<AtomicUsize>) -> Router {
    let handler = move |Extension(identity): Extension<Identity>| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            (StatusCode::IM_A_TEAPOT, identity.kind())
        }
    };

    Router::new()
        .route("/api/secret/data", get(handler.clone()))
        .route("/api/health_checker", get(handler))
        .layer(axum::middleware::from_fn_with_state(
            AccessGate::default(),
            access_gate,
        ))
}

fn request(path: &str, session: Option<Session>) -> Request<Body> {
    let mut request = Request::builder().uri(path).body(Body::empty()).unwrap();
    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    request
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_middleware_rejects_without_calling_downstream() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = counting_app(calls.clone());

    let response = app
        .clone()
        .oneshot(request("/api/secret/data", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Unauthorized", "code": 401})
    );

    let response = app
        .oneshot(request(
            "/api/secret/data",
            Some(Session::for_subject("client|abc")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Anonymous User Not Allow", "code": 403})
    );

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_middleware_passes_response_through_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = counting_app(calls.clone());

    let response = app
        .oneshot(request(
            "/api/secret/data",
            Some(Session::for_subject("user|42")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"authenticated");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_middleware_inserts_absent_identity_on_public_path() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = counting_app(calls.clone());

    let response = app
        .oneshot(request("/api/health_checker", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"absent");
}
