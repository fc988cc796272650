use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;

use edon_core::{AgentId, AuditEvent, Verdict};
use edon_store::AuditEventFilter;

use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// Query parameters accepted by `GET /audit/query` (spec.md §6).
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AuditQuery {
    pub agent_id: Option<String>,
    pub verdict: Option<Verdict>,
    pub intent_id: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /audit/query` — filtered append-only audit log read.
#[utoipa::path(get, path = "/audit/query", params(AuditQuery), responses((status = 200, body = [AuditEvent])))]
pub async fn query_audit(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEvent>>, ServerError> {
    let filter = AuditEventFilter {
        agent_id: query.agent_id.map(AgentId::from),
        verdict: query.verdict,
        intent_id: query.intent_id.map(edon_core::IntentId::from),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
    };
    let events = state.store.query_audit_events(filter).await?;
    Ok(Json(events))
}
