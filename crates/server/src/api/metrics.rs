use axum::extract::{Extension, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::schemas::TrustSpecBenchmark;
use crate::auth::Identity;
use crate::error::ServerError;
use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

async fn active_intent_count(state: &AppState) -> u64 {
    u64::from(state.store.get_latest_intent(None).await.is_ok())
}

/// `GET /metrics` — JSON counters snapshot (spec.md §4.12).
#[utoipa::path(get, path = "/metrics", responses((status = 200, body = MetricsSnapshot)))]
pub async fn metrics_json(State(state): State<AppState>, Extension(_identity): Extension<Identity>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// `GET /metrics/prometheus` — Prometheus text exposition format.
#[utoipa::path(get, path = "/metrics/prometheus", responses((status = 200, description = "Prometheus text exposition")))]
pub async fn metrics_prometheus(State(state): State<AppState>, Extension(_identity): Extension<Identity>) -> Response {
    let body = state.metrics.render_prometheus(active_intent_count(&state).await);
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
}

/// `GET /benchmark/trust-spec` — the anti-bypass benchmark triple (spec.md
/// §4.12): decision overhead, block rate, bypass resistance score.
#[utoipa::path(get, path = "/benchmark/trust-spec", responses((status = 200, body = TrustSpecBenchmark)))]
pub async fn trust_spec(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
) -> Result<Json<TrustSpecBenchmark>, ServerError> {
    let score = crate::anti_bypass::bypass_resistance_score(
        state.config.network_gating,
        state.config.token_hardening,
        state.config.credentials_strict,
    );
    Ok(Json(TrustSpecBenchmark {
        latency_overhead_ms: state.metrics.p50_latency_ms(),
        block_rate: state.metrics.block_rate(),
        bypass_resistance_score: score,
    }))
}
