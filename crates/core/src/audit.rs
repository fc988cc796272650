use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Verdict;
use crate::types::{AgentId, EventId, IntentId, TenantId};

/// Append-only record written once per decided `/execute` request
/// (spec.md §3, AuditEvent entity; invariant: exactly one per request).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditEvent {
    pub event_id: EventId,
    pub decision_id: crate::types::DecisionId,
    /// Denormalized from the paired [`crate::decision::Decision`] so that
    /// audit queries can filter and index by verdict without a join
    /// (spec.md §4.1 required index `audit_events(verdict)`).
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<IntentId>,
    /// Snapshot of the action: full params if `audit_level: detailed`,
    /// otherwise redacted (see `edon-auditor::redact`).
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub action_snapshot: serde_json::Value,
    /// Snapshot of the `GovernorContext` at decision time. MUST NOT
    /// duplicate `intent_id` (spec.md §4.4).
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub context_snapshot: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_event_serde_roundtrip() {
        let event = AuditEvent {
            event_id: EventId::generate(),
            decision_id: crate::types::DecisionId::generate(),
            verdict: Verdict::Allow,
            tenant_id: Some(TenantId::from("t1")),
            agent_id: None,
            intent_id: Some(IntentId::from("i1")),
            action_snapshot: serde_json::json!({"tool": "email"}),
            context_snapshot: serde_json::json!({}),
            timestamp: Utc::now(),
            latency_ms: 12,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_id, event.event_id);
    }
}
