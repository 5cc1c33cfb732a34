// ============================
// passport-lib/src/handlers/health.rs
// ============================
//! Liveness endpoint.
use axum::Json;
use serde_json::{json, Value};

/// Report service liveness
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
