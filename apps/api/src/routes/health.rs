use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which optional features are active.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "weathercare-api",
        "features": {
            "model": state.model.is_some(),
            "ai_advisory": state.advisor.is_some(),
            "contact_store": state.contact_store.as_ref().map(|s| s.backend()),
        }
    }))
}
