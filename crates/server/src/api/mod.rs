pub mod audit;
pub mod clawdbot;
pub mod credentials;
pub mod decisions;
pub mod execute;
pub mod health;
pub mod integrations;
pub mod intent;
pub mod metrics;
pub mod openapi;
pub mod plan;
pub mod policy_packs;
pub mod schemas;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use edon_core::GovernorContext;
use edon_validator::Limits;

use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

use self::openapi::ApiDoc;

/// Authenticate the caller and stash the resolved [`Identity`] in the
/// request's extensions for downstream middleware/handlers (spec.md §4.7).
async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ServerError> {
    let identity = crate::auth::authenticate(req.headers(), &state.store, &state.config).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Check and record the caller's rate-limit buckets (spec.md §4.5). Runs
/// after auth so it has an `Identity` to key on; derives `principal` only
/// from headers, never the body.
async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ServerError> {
    let identity = req.extensions().get::<Identity>().cloned();
    let (principal, authenticated) = match &identity {
        Some(identity) => (identity.rate_limit_key.clone(), true),
        None => ("anonymous".to_owned(), false),
    };

    match state.rate_limiter.check_and_record(&principal, authenticated, Utc::now()).await {
        Ok(()) => Ok(next.run(req).await),
        Err(exceeded) => {
            state.metrics.record_rate_limit_hit();
            Err(ServerError::RateLimited { retry_after_seconds: exceeded.retry_after_seconds })
        }
    }
}

/// Build the `GovernorContext` a Governor call needs from the caller's
/// resolved identity and optional headers (spec.md §4.3: `{agent_id?,
/// tenant_id?, session_id?, approvals[]}`).
pub(crate) fn build_context(identity: &Identity, headers: &HeaderMap) -> GovernorContext {
    let mut context = GovernorContext::new().with_tenant(identity.tenant_id.clone());
    if let Some(agent_id) = &identity.agent_id {
        context = context.with_agent(agent_id.clone());
    }
    if let Some(session_id) = headers.get("x-session-id").and_then(|v| v.to_str().ok()) {
        context.session_id = Some(session_id.to_owned());
    }
    if let Some(approval) = headers.get("x-approval").and_then(|v| v.to_str().ok()) {
        context = context.with_approval(approval);
    }
    context
}

/// Read `X-Intent-ID` if present.
pub(crate) fn explicit_intent_id(headers: &HeaderMap) -> Option<edon_core::IntentId> {
    headers.get("x-intent-id").and_then(|v| v.to_str().ok()).map(edon_core::IntentId::from)
}

/// Run the Validator's size/structure/script-injection checks against a raw
/// request body, then deserialize it into `T` (spec.md §4.6). Used by every
/// handler that accepts a JSON body instead of a blanket body-reading
/// middleware, since each endpoint's shape differs.
pub(crate) async fn read_validated_json<T: DeserializeOwned>(body: Bytes) -> Result<T, ServerError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ServerError::ValidationFailed(format!("malformed JSON body: {e}")))?;
    edon_validator::validate_request(body.len(), &value, Limits::default())?;
    serde_json::from_value(value).map_err(|e| ServerError::ValidationFailed(format!("malformed request body: {e}")))
}

/// Build the Axum router: CORS (outermost) → Authenticator → RateLimiter →
/// handler (spec.md §4.8 "HTTP request ordering"). The Validator runs inside
/// each handler that accepts a body, since its size/shape checks are
/// endpoint-specific.
#[must_use]
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/version", get(health::version));

    let protected = Router::new()
        .route("/intent/set", post(intent::set_intent))
        .route("/intent/get", get(intent::get_intent))
        .route("/execute", post(execute::execute))
        .route("/clawdbot/invoke", post(clawdbot::invoke))
        .route("/audit/query", get(audit::query_audit))
        .route("/decisions/query", get(decisions::query_decisions))
        .route("/decisions/{id}", get(decisions::get_decision))
        .route("/credentials/set", post(credentials::set_credential))
        .route("/credentials/{id}", delete(credentials::delete_credential))
        .route("/policy-packs", get(policy_packs::list_packs))
        .route("/policy-packs/{name}/apply", post(policy_packs::apply_pack))
        .route("/integrations/clawdbot/connect", post(integrations::connect_clawdbot))
        .route("/account/integrations", get(integrations::account_integrations))
        .route("/metrics", get(metrics::metrics_json))
        .route("/metrics/prometheus", get(metrics::metrics_prometheus))
        .route("/benchmark/trust-spec", get(metrics::trust_spec))
        .route("/plan", post(plan::plan))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let cors = if state.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins).allow_methods(tower_http::cors::Any).allow_headers(tower_http::cors::Any)
    };

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
