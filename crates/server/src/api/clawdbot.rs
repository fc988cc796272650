use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;

use edon_core::Action;

use crate::api::schemas::{ClawdbotInvokeRequest, DecisionEnvelope, ExecutionBlock};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::pipeline::{self, PipelineOutcome};
use crate::state::AppState;

/// `POST /clawdbot/invoke` — the remote-bot-proxy-specific entry point
/// (spec.md §6). Wraps the inner `{tool, action, args}` payload as a single
/// `clawdbot`/`invoke` Action so it runs through the same Governor/Auditor
/// pipeline as every other tool call, carrying `args` as `params`.
#[utoipa::path(post, path = "/clawdbot/invoke", request_body = ClawdbotInvokeRequest, responses((status = 200, body = DecisionEnvelope)))]
pub async fn invoke(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DecisionEnvelope>, ServerError> {
    let req: ClawdbotInvokeRequest = crate::api::read_validated_json(body).await?;
    let params = serde_json::json!({
        "tool": req.tool,
        "action": req.action,
        "args": req.args,
        "sessionKey": req.session_key,
    });
    edon_validator::validate_params_size(&params, edon_validator::Limits::default())?;

    if !identity.is_active() {
        return Err(ServerError::Forbidden);
    }

    let action = Action::new("clawdbot", "invoke", params);
    let explicit_intent_id = crate::api::explicit_intent_id(&headers);
    let intent = pipeline::resolve_intent(&state, Some(&identity.tenant_id), explicit_intent_id.as_ref(), &action).await?;
    let context = crate::api::build_context(&identity, &headers);

    let outcome: PipelineOutcome = pipeline::run_pipeline(&state, &intent, action, context).await?;
    let envelope: DecisionEnvelope = DecisionEnvelope {
        verdict: outcome.decision.verdict,
        decision_id: outcome.decision.decision_id.to_string(),
        reason_code: outcome.decision.reason_code,
        explanation: outcome.decision.explanation,
        escalation: outcome.decision.escalation,
        execution: outcome.execution.map(|execution| ExecutionBlock {
            tool: "clawdbot".to_owned(),
            op: "invoke".to_owned(),
            result: execution.result,
            error: execution.error,
            observation: execution.observation,
        }),
    };
    Ok(Json(envelope))
}
