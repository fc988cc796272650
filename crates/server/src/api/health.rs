use axum::extract::State;
use axum::Json;

use crate::api::schemas::VersionResponse;
use crate::state::AppState;

/// `GET /health` — liveness probe. No auth required (spec.md §6).
#[utoipa::path(get, path = "/health", responses((status = 200, description = "gateway is up")))]
pub async fn health(State(_state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /version` — build identity. No auth required.
#[utoipa::path(get, path = "/version", responses((status = 200, body = VersionResponse)))]
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
