//! Tests for error handling and IntoResponse implementation.

use crate::auth::DenyReason;
use crate::error::*;
use axum::{http::StatusCode, response::IntoResponse};

async fn response_json(error: ServerError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_unauthenticated_body() {
    let (status, body) = response_json(ServerError::Unauthenticated).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, serde_json::json!({"error": "Unauthorized", "code": 401}));
}

#[tokio::test]
async fn test_anonymous_forbidden_body() {
    let (status, body) = response_json(ServerError::AnonymousForbidden).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        serde_json::json!({"error": "Anonymous User Not Allow", "code": 403})
    );
}

#[tokio::test]
async fn test_invalid_request_body_carries_bare_message() {
    let (status, body) =
        response_json(ServerError::InvalidRequest(r#"Field "messages" is empty"#.into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], r#"Field "messages" is empty"#);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_agent_error_body() {
    let (status, body) = response_json(bometa_core::AgentError::NoResponse.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Agent error: Model returned no text response");
}

#[test]
fn test_from_deny_reason() {
    assert!(matches!(
        ServerError::from(DenyReason::Unauthenticated),
        ServerError::Unauthenticated
    ));
    assert!(matches!(
        ServerError::from(DenyReason::AnonymousForbidden),
        ServerError::AnonymousForbidden
    ));
}

#[test]
fn test_status_matches_deny_reason() {
    for reason in [DenyReason::Unauthenticated, DenyReason::AnonymousForbidden] {
        assert_eq!(ServerError::from(reason).status(), reason.status());
    }
}

#[test]
fn test_status_code_correctness() {
    let test_cases = [
        (ServerError::Unauthenticated, 401),
        (ServerError::AnonymousForbidden, 403),
        (ServerError::InvalidRequest(String::new()), 400),
        (bometa_core::AgentError::EmptyResponse.into(), 500),
    ];

    for (error, expected_code) in test_cases {
        let response = error.into_response();
        assert_eq!(response.status().as_u16(), expected_code);
    }
}

#[test]
fn test_server_error_display() {
    let cases = [
        (ServerError::Unauthenticated, "Unauthorized"),
        (ServerError::AnonymousForbidden, "Anonymous User Not Allow"),
        (
            ServerError::InvalidRequest("bad".to_string()),
            "Invalid request: bad",
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_agent_error_conversion_preserves_message() {
    let agent_error = bometa_core::AgentError::ToolNotFound("search_wiki".to_string());
    let server_error: ServerError = agent_error.into();

    assert!(matches!(server_error, ServerError::Agent(_)));
    assert!(server_error.to_string().contains("search_wiki"));
}

#[test]
fn test_config_error_display() {
    let error = ConfigError::InvalidBind("nowhere:port".to_string());
    assert_eq!(error.to_string(), "Invalid bind address: nowhere:port");

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(ConfigError::from(json_error), ConfigError::Json(_)));
}

#[test]
fn test_build_error_display() {
    assert!(BuildError::NoProvider.to_string().contains(".provider()"));
}

#[test]
fn test_error_types_are_send_sync() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}

    is_send::<ServerError>();
    is_sync::<ServerError>();
    is_send::<ConfigError>();
    is_sync::<ConfigError>();
}
