use std::sync::atomic::{AtomicU64, Ordering};

use edon_core::{Action, Decision, GovernorContext, Intent};
use edon_store::Store;

use crate::record::build_audit_event;

/// Writes exactly one `AuditEvent` + one `Decision` per decided request, in a
/// single Store transaction (spec.md §4.4). The transaction boundary itself
/// lives in [`edon_store::Store::save_audit_event`]; this component is
/// responsible for building the audit snapshot and for the never-mask-the-
/// decision invariant.
pub struct Auditor<S: Store> {
    store: S,
    audit_write_failures: AtomicU64,
}

impl<S: Store> Auditor<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            audit_write_failures: AtomicU64::new(0),
        }
    }

    /// Number of audit persistence failures observed since startup.
    #[must_use]
    pub fn audit_write_failures(&self) -> u64 {
        self.audit_write_failures.load(Ordering::Relaxed)
    }

    /// Record `decision` alongside its originating `action`/`intent`/`context`
    /// and return it unchanged. A persistence failure is logged and counted
    /// but never propagated to the caller — the decision the Governor already
    /// produced must reach the caller regardless of audit-trail health.
    pub async fn record(
        &self,
        action: &Action,
        intent: Option<&Intent>,
        context: &GovernorContext,
        decision: Decision,
        latency_ms: u64,
    ) -> Decision {
        let event = build_audit_event(action, intent, &decision, context, latency_ms);

        if let Err(err) = self.store.save_audit_event(event, decision.clone()).await {
            self.audit_write_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                error = %err,
                decision_id = %decision.decision_id,
                "audit write failed; returning decision unaudited"
            );
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edon_core::{ActionFingerprint, DecisionId, ReasonCode, RiskLevel, Verdict};
    use edon_store::{SqliteStore, StoreConfig};

    fn test_decision() -> Decision {
        Decision {
            decision_id: DecisionId::generate(),
            action_fingerprint: ActionFingerprint::from("fp"),
            verdict: Verdict::Allow,
            reason_code: ReasonCode::Approved,
            explanation: "ok".into(),
            safe_alternative: None,
            escalation: None,
            computed_risk: RiskLevel::Low,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn test_auditor() -> Auditor<SqliteStore> {
        let store = SqliteStore::connect(&StoreConfig {
            database_path: ":memory:".into(),
            pool_size: 1,
        })
        .await
        .unwrap();
        Auditor::new(store)
    }

    #[tokio::test]
    async fn record_returns_decision_unchanged() {
        let auditor = test_auditor().await;
        let action = Action::new("email", "read", serde_json::Value::Null);
        let decision = test_decision();
        let decision_id = decision.decision_id.clone();
        let returned = auditor
            .record(&action, None, &GovernorContext::new(), decision, 3)
            .await;
        assert_eq!(returned.decision_id, decision_id);
        assert_eq!(auditor.audit_write_failures(), 0);
    }

    #[tokio::test]
    async fn successful_write_does_not_increment_failure_counter() {
        let auditor = test_auditor().await;
        let action = Action::new("email", "send", serde_json::json!({"to": "a@x.com"}));
        auditor
            .record(&action, None, &GovernorContext::new(), test_decision(), 10)
            .await;
        assert_eq!(auditor.audit_write_failures(), 0);
    }
}
