use axum::http::HeaderMap;
use edon_core::{AgentId, Tenant, TenantId, TenantStatus};
use edon_store::Store;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::GatewayConfig;
use crate::error::ServerError;

/// The authenticated caller for one request (spec.md §4.7). Distinct from
/// `edon_core::Principal`, which is the persisted token→agent binding row;
/// this is the resolved identity a handler actually gets to act on.
#[derive(Debug, Clone)]
pub struct Identity {
    pub tenant_id: TenantId,
    pub plan: String,
    pub status: TenantStatus,
    pub agent_id: Option<AgentId>,
    /// Stable string used as the RateLimiter's `principal` key.
    pub rate_limit_key: String,
}

impl Identity {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.can_execute()
    }
}

/// SHA-256 hex digest of a bearer token. Comparisons against the
/// configured token always happen on digests, never on raw token bytes, so
/// a length mismatch on the raw secret can't leak through timing.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("x-edon-token").and_then(|v| v.to_str().ok()) {
        return Some(value);
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Extract and validate the caller's token, then resolve tenant/agent
/// binding (spec.md §4.7). Never distinguishes "missing" from "invalid" in
/// its error output — both surface as a generic 401.
pub async fn authenticate<S: Store>(
    headers: &HeaderMap,
    store: &S,
    config: &GatewayConfig,
) -> Result<Identity, ServerError> {
    let token = extract_token(headers).ok_or(ServerError::AuthMissing)?;
    let token_hash = hash_token(token);

    let configured_hash = hash_token(&config.api_token);
    if token_hash.as_bytes().ct_eq(configured_hash.as_bytes()).unwrap_u8() != 1 {
        return Err(ServerError::AuthInvalid);
    }

    let tenant_id = headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .map(TenantId::from)
        .unwrap_or_else(|| TenantId::from("default"));

    let tenant = match store.get_tenant(&tenant_id).await {
        Ok(tenant) => tenant,
        Err(edon_store::StoreError::NotFound(_)) => Tenant {
            tenant_id: tenant_id.clone(),
            plan: "default".to_owned(),
            status: TenantStatus::Active,
            default_intent_id: None,
        },
        Err(other) => return Err(other.into()),
    };

    let agent_id = if config.token_binding_enabled {
        resolve_agent_binding(headers, store, &token_hash).await?
    } else {
        None
    };

    Ok(Identity {
        tenant_id: tenant.tenant_id,
        plan: tenant.plan,
        status: tenant.status,
        agent_id,
        rate_limit_key: token_hash,
    })
}

async fn resolve_agent_binding<S: Store>(
    headers: &HeaderMap,
    store: &S,
    token_hash: &str,
) -> Result<Option<AgentId>, ServerError> {
    let claimed = headers.get("x-agent-id").and_then(|v| v.to_str().ok()).map(AgentId::from);

    let agent_id = if let Some(agent_id) = claimed {
        store
            .bind_token(token_hash, agent_id.clone())
            .await
            .map_err(|_| ServerError::AuthInvalid)?;
        Some(agent_id)
    } else {
        store.lookup_token(token_hash).await?.map(|binding| binding.agent_id)
    };

    if let Err(err) = store.touch_token(token_hash).await {
        tracing::warn!(error = %err, "failed to touch token last_used_at");
    }

    Ok(agent_id)
}
