//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

pub async fn health_checker() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
