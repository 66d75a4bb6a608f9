//! Health check endpoint.

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe; no authentication, no database round-trip.
pub async fn check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
