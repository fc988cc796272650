use chrono::Utc;
use edon_connectors::ConnectorOutcome;
use edon_core::{compute_fingerprint, Action, Decision, GovernorContext, Intent, IntentId, TenantId};
use edon_store::{DecisionFilter, Store};

use crate::error::ServerError;
use crate::state::AppState;

/// Outcome of running one action through intent resolution, the Governor,
/// the Auditor, and (when executable) a Connector (spec.md §4.8).
pub struct PipelineOutcome {
    pub decision: Decision,
    pub execution: Option<ConnectorOutcome>,
}

/// How many past decisions for the same action fingerprint feed the
/// Governor's loop detector (spec.md §4.8 step 5's window is small; this
/// bounds the query rather than scanning the whole table).
const LOOP_HISTORY_LIMIT: u32 = 50;

/// Resolve the Intent an action is evaluated against (spec.md §4.8 step 1):
/// an explicit `intent_id` wins; otherwise fall back to the tenant's latest
/// saved intent; otherwise synthesize one. Only read ops get a synthesized
/// intent that's actually usable — everything else gets an empty, unapproved
/// intent so the Governor's own scope check produces the BLOCK.
pub async fn resolve_intent(
    state: &AppState,
    tenant_id: Option<&TenantId>,
    explicit_intent_id: Option<&IntentId>,
    action: &Action,
) -> Result<Intent, ServerError> {
    if let Some(intent_id) = explicit_intent_id {
        return Ok(state.store.get_intent(intent_id).await?);
    }

    match state.store.get_latest_intent(tenant_id).await {
        Ok(intent) => Ok(intent),
        Err(edon_store::StoreError::NotFound(_)) => {
            if action.is_read() {
                Ok(Intent::synthesize_read_only(&action.tool, &action.op))
            } else {
                Ok(Intent::new("no intent on file for tenant", edon_core::RiskLevel::Low))
            }
        }
        Err(other) => Err(other.into()),
    }
}

/// Run `action` through the Governor, persist the result via the Auditor,
/// and dispatch to a Connector if the verdict is executable (spec.md §4.8
/// steps 2-4). Exactly one [`Decision`]/`AuditEvent` pair is written per
/// call regardless of outcome.
pub async fn run_pipeline(
    state: &AppState,
    intent: &Intent,
    action: Action,
    context: GovernorContext,
) -> Result<PipelineOutcome, ServerError> {
    let start = std::time::Instant::now();
    let now = Utc::now();

    let fingerprint = compute_fingerprint(&action, &intent.intent_id);
    let history = state
        .store
        .query_decisions(DecisionFilter {
            action_fingerprint: Some(fingerprint),
            limit: LOOP_HISTORY_LIMIT,
            ..Default::default()
        })
        .await
        .unwrap_or_default();
    let recent_timestamps: Vec<_> = history.iter().map(|d| d.timestamp).collect();

    let decision = edon_governor::decide(intent, &action, &context, now, &recent_timestamps);

    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let decision = state.auditor.record(&action, Some(intent), &context, decision, latency_ms).await;
    state.metrics.record_decision(decision.verdict, decision.reason_code, latency_ms);

    // The decision is recorded above regardless of what happens next, so a
    // CredentialMissing error surfacing as a 503 here never leaves the
    // audit trail out of sync with the response.
    let execution = if decision.verdict.is_executable() {
        Some(dispatch(state, &action, &context).await?)
    } else {
        None
    };

    Ok(PipelineOutcome { decision, execution })
}

/// Dispatch an executable action to its registered Connector (spec.md
/// §4.9). A missing connector surfaces as a failed [`ConnectorOutcome`]
/// (HTTP 200, `ok: false`); a missing credential under `CREDENTIALS_STRICT`
/// surfaces as a hard 503 instead, since there's no safe way to attempt the
/// call at all.
async fn dispatch(state: &AppState, action: &Action, context: &GovernorContext) -> Result<ConnectorOutcome, ServerError> {
    let Some(connector) = state.connectors.get(&action.tool) else {
        return Ok(ConnectorOutcome::failure(format!("no connector registered for tool {}", action.tool)));
    };

    let tenant_id = context.tenant_id.as_ref();
    let credential = match state.vault.get_for_execution(&action.tool, tenant_id).await {
        Ok(handle) => Some(handle),
        Err(edon_vault::VaultError::CredentialMissing(tool)) if !state.vault.is_strict() => {
            tracing::debug!(tool = %tool, "dispatching without a credential");
            None
        }
        Err(err) => return Err(err.into()),
    };

    Ok(connector.execute(&action.op, &action.params, credential.as_ref(), context).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use edon_connectors::ConnectorRegistry;
    use edon_core::RiskLevel;
    use edon_store::{SqliteStore, StoreConfig};
    use edon_vault::Vault;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::metrics::Metrics;

    async fn test_state() -> AppState {
        let store = SqliteStore::connect(&StoreConfig { database_path: ":memory:".into(), pool_size: 1 })
            .await
            .unwrap();
        let master_key = edon_vault::parse_master_key(&"7".repeat(32)).unwrap();
        AppState {
            vault: Arc::new(Vault::new(store.clone(), master_key, false)),
            auditor: Arc::new(edon_auditor::Auditor::new(store.clone())),
            rate_limiter: Arc::new(edon_ratelimit::RateLimiter::new(store.clone())),
            store,
            connectors: Arc::new(ConnectorRegistry::new()),
            config: Arc::new(GatewayConfig::default()),
            metrics: Arc::new(Metrics::new()),
        }
    }

    #[tokio::test]
    async fn resolve_intent_synthesizes_read_only_when_none_saved() {
        let state = test_state().await;
        let action = Action::new("email", "read", serde_json::Value::Null);
        let intent = resolve_intent(&state, None, None, &action).await.unwrap();
        assert!(intent.allows("email", "read"));
        assert!(!intent.approved_by_user);
    }

    #[tokio::test]
    async fn resolve_intent_synthesizes_empty_scope_for_non_read_when_none_saved() {
        let state = test_state().await;
        let action = Action::new("email", "send", serde_json::Value::Null);
        let intent = resolve_intent(&state, None, None, &action).await.unwrap();
        assert!(!intent.allows("email", "send"));
    }

    #[tokio::test]
    async fn pipeline_blocks_out_of_scope_action_and_skips_dispatch() {
        let state = test_state().await;
        let intent = Intent::new("empty", RiskLevel::Low);
        let action = Action::new("email", "send", serde_json::Value::Null);
        let outcome = run_pipeline(&state, &intent, action, GovernorContext::new()).await.unwrap();
        assert_eq!(outcome.decision.verdict, edon_core::Verdict::Block);
        assert!(outcome.execution.is_none());
    }

    #[tokio::test]
    async fn pipeline_dispatch_without_connector_fails_closed_with_outcome() {
        let state = test_state().await;
        let mut intent = Intent::new("approved", RiskLevel::Low);
        intent.approved_by_user = true;
        intent.scope.insert("email".into(), vec!["read".into()]);
        let action = Action::new("email", "read", serde_json::Value::Null);
        let outcome = run_pipeline(&state, &intent, action, GovernorContext::new()).await.unwrap();
        assert_eq!(outcome.decision.verdict, edon_core::Verdict::Allow);
        let execution = outcome.execution.unwrap();
        assert!(!execution.ok);
    }
}
