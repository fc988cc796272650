use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use edon_core::{ActionFingerprint, Decision, DecisionId, Verdict};
use edon_store::DecisionFilter;

use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// Query parameters accepted by `GET /decisions/query` (spec.md §6).
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DecisionQuery {
    pub verdict: Option<Verdict>,
    pub action_fingerprint: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /decisions/query` — filtered decision log read.
#[utoipa::path(get, path = "/decisions/query", params(DecisionQuery), responses((status = 200, body = [Decision])))]
pub async fn query_decisions(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Query(query): Query<DecisionQuery>,
) -> Result<Json<Vec<Decision>>, ServerError> {
    let filter = DecisionFilter {
        verdict: query.verdict,
        action_fingerprint: query.action_fingerprint.map(ActionFingerprint::from),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
    };
    let decisions = state.store.query_decisions(filter).await?;
    Ok(Json(decisions))
}

/// `GET /decisions/{id}` — a single decision by id.
#[utoipa::path(get, path = "/decisions/{id}", responses((status = 200, body = Decision), (status = 400, description = "no such decision")))]
pub async fn get_decision(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Decision>, ServerError> {
    let decision = state.store.get_decision(&DecisionId::from(id)).await?;
    Ok(Json(decision))
}
