use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config::BackendKind;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let backend = match state.config.backend {
        BackendKind::Postgres => "postgres",
        BackendKind::Memory => "memory",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "timeseal-api",
        "backend": backend
    }))
}
