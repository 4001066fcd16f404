//! Tests for the router builder.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::routing::get;
use bometa_core::test_utils::MockProvider;
use tower::ServiceExt;

use super::*;
use crate::session::Session;

fn request(method: Method, path: &str, session: Option<Session>) -> Request<Body> {
    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .unwrap();
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

#[test]
fn test_build_without_provider_fails() {
    let result = GatewayRouter::new().build();
    assert!(matches!(result, Err(BuildError::NoProvider)));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new())
        .build()
        .unwrap();

    let response = app
        .oneshot(request(Method::GET, HEALTH_PATH, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_qa_is_open_to_anonymous_clients() {
    let provider = MockProvider::new().with_text("hello");
    let app = GatewayRouter::new()
        .provider(provider.clone())
        .build()
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(Method::POST, QA_PATH, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.call_count(), 0);

    let response = app
        .oneshot(request(
            Method::POST,
            QA_PATH,
            Some(Session::for_subject("client|abc")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "hello");
}

#[tokio::test]
async fn test_merged_routes_are_gated() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new())
        .merge(Router::new().route("/api/bot/create", get(|| async { "created" })))
        .build()
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/bot/create",
            Some(Session::for_subject("client|abc")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/bot/create",
            Some(Session::for_subject("user|42")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fallback_is_gated() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new())
        .build()
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/missing", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/missing",
            Some(Session::for_subject("user|42")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], 404);
}

#[tokio::test]
async fn test_custom_policy() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new().with_text("hi"))
        .policy(RoutePolicy::builder().public_path(QA_PATH).build())
        .build()
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(Method::POST, QA_PATH, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(Method::GET, HEALTH_PATH, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_source_feeds_gate() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new())
        .merge(Router::new().route("/api/secret/data", get(|| async { "secret" })))
        .session_source(TrustedHeaderSession::new(HeaderName::from_static(
            "x-auth-subject",
        )))
        .build()
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/secret/data")
                .header("x-auth-subject", "user|42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_is_answered_before_the_gate() {
    let app = GatewayRouter::new()
        .provider(MockProvider::new())
        .cors(CorsLayer::very_permissive())
        .build()
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/bot/create")
                .header("Origin", "https://bots.example.com")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://bots.example.com"
    );
}

#[tokio::test]
async fn test_from_config() {
    let config = GatewayConfig::from_json_str(
        r#"{
            "system_prompt": "Be brief.",
            "bots": {"docs": {"prompt": "Docs only."}},
            "trusted_subject_header": "x-auth-subject",
            "trusted_token_header": "x-auth-token"
        }"#,
    )
    .unwrap();

    let provider = MockProvider::new().with_text("a").with_text("b");
    let app = GatewayRouter::from_config(&config)
        .unwrap()
        .provider(provider.clone())
        .build()
        .unwrap();

    let with_subject = |body: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri(QA_PATH)
            .header("Content-Type", "application/json")
            .header("x-auth-subject", "client|abc")
            .body(Body::from(body))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(with_subject(
            r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(with_subject(
            r#"{"messages": [{"role": "user", "content": "hi"}], "bot_id": "docs"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(provider.received_system_prompt(0).as_deref(), Some("Be brief."));
    assert_eq!(provider.received_system_prompt(1).as_deref(), Some("Docs only."));
}

#[test]
fn test_from_config_rejects_bad_header() {
    let config =
        GatewayConfig::from_json_str(r#"{"trusted_subject_header": "bad header"}"#).unwrap();
    assert!(matches!(
        GatewayRouter::from_config(&config),
        Err(ConfigError::InvalidHeader(_))
    ));
}
