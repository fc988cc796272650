use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::Json;

use edon_core::Intent;

use crate::api::schemas::{IntentResponse, SetIntentRequest};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

impl From<(SetIntentRequest, &Identity)> for Intent {
    fn from((req, identity): (SetIntentRequest, &Identity)) -> Self {
        let mut intent = Intent::new(req.objective, req.risk_level);
        intent.tenant_id = Some(identity.tenant_id.clone());
        intent.scope = req.scope;
        intent.constraints = req.constraints;
        intent.approved_by_user = req.approved_by_user;
        intent
    }
}

impl From<Intent> for IntentResponse {
    fn from(intent: Intent) -> Self {
        Self {
            intent_id: intent.intent_id.to_string(),
            objective: intent.objective,
            scope: intent.scope,
            constraints: intent.constraints,
            risk_level: intent.risk_level,
            approved_by_user: intent.approved_by_user,
        }
    }
}

/// `POST /intent/set` — persist a tenant's Intent and make it the tenant's
/// default (spec.md §3, §6). Operator sign-off (`approved_by_user`) is taken
/// verbatim from the request; the gateway never infers approval.
#[utoipa::path(post, path = "/intent/set", request_body = SetIntentRequest, responses((status = 200, body = IntentResponse)))]
pub async fn set_intent(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<IntentResponse>, ServerError> {
    let req: SetIntentRequest = crate::api::read_validated_json(body).await?;
    let intent: Intent = (req, &identity).into();
    let intent_id = state.store.save_intent(intent.clone()).await?;
    state.store.set_tenant_default_intent(&identity.tenant_id, &intent_id).await?;
    Ok(Json(intent.into()))
}

/// `GET /intent/get` — the tenant's currently active default Intent.
#[utoipa::path(get, path = "/intent/get", responses((status = 200, body = IntentResponse)))]
pub async fn get_intent(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<IntentResponse>, ServerError> {
    let intent = state.store.get_latest_intent(Some(&identity.tenant_id)).await?;
    Ok(Json(intent.into()))
}
