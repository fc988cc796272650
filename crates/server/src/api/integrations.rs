use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::Json;

use edon_core::{CredentialId, CredentialType};

use crate::anti_bypass::classify_url;
use crate::api::schemas::{ConnectClawdbotRequest, IntegrationAccountStatus};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

const CLAWDBOT_CREDENTIAL_ID: &str = "clawdbot-default";

/// `POST /integrations/clawdbot/connect` — store the remote-bot-proxy's base
/// URL and secret as the tenant's `clawdbot` credential (spec.md §6). Accepts
/// both the current `{base_url, auth_mode, secret}` shape and the legacy
/// `{gateway_url, gateway_token}` shape.
#[utoipa::path(post, path = "/integrations/clawdbot/connect", request_body = ConnectClawdbotRequest, responses((status = 200, description = "connected")))]
pub async fn connect_clawdbot(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServerError> {
    let req: ConnectClawdbotRequest = crate::api::read_validated_json(body).await?;
    let (base_url, secret) = req.into_base_url_and_secret();

    if state.config.network_gating {
        let reachability = classify_url(&base_url);
        if matches!(reachability, crate::anti_bypass::Reachability::Public | crate::anti_bypass::Reachability::Unknown) {
            return Err(ServerError::ValidationFailed(format!(
                "clawdbot base_url classifies as {reachability:?} with NETWORK_GATING on"
            )));
        }
    }

    state
        .vault
        .set(
            CredentialId::from(CLAWDBOT_CREDENTIAL_ID),
            "clawdbot".to_owned(),
            Some(identity.tenant_id.clone()),
            CredentialType::BotGateway,
            serde_json::json!({"base_url": base_url, "secret": secret}),
            true,
        )
        .await?;

    Ok(Json(serde_json::json!({"connected": true})))
}

/// `GET /account/integrations` — connectivity and bypass-risk snapshot for
/// the tenant's `clawdbot` integration (spec.md §4.11).
#[utoipa::path(get, path = "/account/integrations", responses((status = 200, body = IntegrationAccountStatus)))]
pub async fn account_integrations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<IntegrationAccountStatus>, ServerError> {
    let status = state.store.get_integration_status(&identity.tenant_id, "clawdbot").await?;

    let reachability = state
        .config
        .clawdbot_base_url
        .as_deref()
        .map_or(crate::anti_bypass::Reachability::Unknown, classify_url);
    let bypass_risk = reachability.bypass_risk().to_owned();

    let recommendation = if bypass_risk == "high" {
        Some("isolate the downstream bot gateway on a loopback or private address".to_owned())
    } else {
        None
    };

    Ok(Json(IntegrationAccountStatus {
        connected: status.connected,
        reachability,
        bypass_risk,
        recommendation,
    }))
}
