use edon_core::{Action, AuditEvent, Decision, EventId, GovernorContext, Intent};

use crate::redact::snapshot_params;

/// Assemble the [`AuditEvent`] for one decided request.
///
/// `context_snapshot` is the raw `GovernorContext` serialized as-is; it never
/// carries `intent_id` since [`GovernorContext`] has no such field, satisfying
/// the "MUST NOT duplicate `intent_id`" invariant (spec.md §4.4) by
/// construction rather than by stripping it after the fact.
#[must_use]
pub fn build_audit_event(
    action: &Action,
    intent: Option<&Intent>,
    decision: &Decision,
    context: &GovernorContext,
    latency_ms: u64,
) -> AuditEvent {
    let audit_level = intent.and_then(|i| i.constraints.audit_level);
    let action_snapshot = serde_json::json!({
        "tool": action.tool,
        "op": action.op,
        "params": snapshot_params(&action.params, audit_level),
    });

    AuditEvent {
        event_id: EventId::generate(),
        decision_id: decision.decision_id.clone(),
        verdict: decision.verdict,
        tenant_id: context.tenant_id.clone(),
        agent_id: context.agent_id.clone(),
        intent_id: intent.map(|i| i.intent_id.clone()),
        action_snapshot,
        context_snapshot: serde_json::to_value(context)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new())),
        timestamp: decision.timestamp,
        latency_ms,
    }
}
