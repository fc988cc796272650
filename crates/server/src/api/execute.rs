use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;

use edon_core::Action;

use crate::api::schemas::{DecisionEnvelope, ExecuteRequest, ExecutionBlock};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::pipeline::{self, PipelineOutcome};
use crate::state::AppState;

impl From<PipelineOutcome> for DecisionEnvelope {
    fn from(outcome: PipelineOutcome) -> Self {
        let execution = outcome.execution.map(|outcome| ExecutionBlock {
            tool: String::new(),
            op: String::new(),
            result: outcome.result,
            error: outcome.error,
            observation: outcome.observation,
        });
        Self {
            verdict: outcome.decision.verdict,
            decision_id: outcome.decision.decision_id.to_string(),
            reason_code: outcome.decision.reason_code,
            explanation: outcome.decision.explanation,
            escalation: outcome.decision.escalation,
            execution,
        }
    }
}

/// `POST /execute` — evaluate one tool/op action and, when the verdict is
/// executable, dispatch it (spec.md §4.8, §6). A tenant with a non-active
/// status is refused outright for anything but a read op; read-only access
/// still needs to pass through the Governor so it lands in the audit trail.
#[utoipa::path(post, path = "/execute", request_body = ExecuteRequest, responses((status = 200, body = DecisionEnvelope)))]
pub async fn execute(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DecisionEnvelope>, ServerError> {
    let req: ExecuteRequest = crate::api::read_validated_json(body.clone()).await?;
    let action: Action = req.into();

    edon_validator::validate_params_size(&action.params, edon_validator::Limits::default())?;

    if !identity.is_active() && !action.is_read() {
        return Err(ServerError::Forbidden);
    }

    let explicit_intent_id = crate::api::explicit_intent_id(&headers);
    let intent = pipeline::resolve_intent(&state, Some(&identity.tenant_id), explicit_intent_id.as_ref(), &action).await?;
    let context = crate::api::build_context(&identity, &headers);

    let mut envelope: DecisionEnvelope = pipeline::run_pipeline(&state, &intent, action.clone(), context).await?.into();
    if let Some(execution) = envelope.execution.as_mut() {
        execution.tool = action.tool;
        execution.op = action.op;
    }
    Ok(Json(envelope))
}
