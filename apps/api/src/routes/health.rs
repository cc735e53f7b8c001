use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Readiness probe. The server only binds after the model is loaded, so
/// answering at all means ready.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health
/// Returns a status object with service version and the loaded model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let artifacts = state.model.artifacts();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerlens-api",
        "model_id": artifacts.model_id(),
        "model_created_at": artifacts.created_at(),
        "classes": artifacts.labels().len()
    }))
}
