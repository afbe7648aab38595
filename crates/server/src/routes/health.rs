use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::ServerState;

pub async fn root() -> Json<Value> {
    Json(json!({ "service": "codecheck", "status": "ok" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness additionally confirms the index backend can still be flushed
/// — a liveness probe alone wouldn't catch a wedged database handle.
pub async fn ready(State(state): State<Arc<ServerState>>) -> Json<Value> {
    match state.index.flush() {
        Ok(()) => Json(json!({ "status": "ready" })),
        Err(e) => Json(json!({ "status": "not_ready", "reason": e.to_string() })),
    }
}
