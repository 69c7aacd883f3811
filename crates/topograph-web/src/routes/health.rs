//! Liveness check.

use axum::Json;
use serde_json::{Value, json};

/// Reports the process is serving; does not touch the graph backend.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
