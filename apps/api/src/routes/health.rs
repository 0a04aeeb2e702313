use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the active vault cipher suite (no secrets).
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let suite = state.vault.suite();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "vault": {
            "cipher": suite.cipher,
            "kdf_iterations": suite.kdf_iterations
        }
    }))
}
