use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;

use edon_core::Action;

use crate::api::schemas::{PlanRequest, PlanResponse, PlanStepResult};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::pipeline;
use crate::state::AppState;

/// `POST /plan` — non-executing step decomposition (spec.md §6). Each step
/// is resolved and evaluated through the Governor exactly like `/execute`,
/// but a step's verdict is never dispatched to a Connector, so a caller can
/// preview what a multi-step plan would do without side effects.
#[utoipa::path(post, path = "/plan", request_body = PlanRequest, responses((status = 200, body = PlanResponse)))]
pub async fn plan(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PlanResponse>, ServerError> {
    let req: PlanRequest = crate::api::read_validated_json(body).await?;
    let explicit_intent_id = crate::api::explicit_intent_id(&headers);
    let context = crate::api::build_context(&identity, &headers);

    let mut steps = Vec::with_capacity(req.steps.len());
    for step in req.steps {
        let tool = step.tool.clone();
        let op = step.op.clone();
        let action: Action = step.into();
        edon_validator::validate_params_size(&action.params, edon_validator::Limits::default())?;

        let intent =
            pipeline::resolve_intent(&state, Some(&identity.tenant_id), explicit_intent_id.as_ref(), &action).await?;
        let decision = edon_governor::decide(&intent, &action, &context, chrono::Utc::now(), &[]);

        steps.push(PlanStepResult {
            tool,
            op,
            verdict: decision.verdict,
            reason_code: decision.reason_code,
            explanation: decision.explanation,
        });
    }

    Ok(Json(PlanResponse { steps }))
}
