use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{IntentId, TenantId};

/// Server-computed or caller-declared risk level for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// The set of operations a tool is permitted to perform under an Intent.
pub type Scope = HashMap<String, Vec<String>>;

/// Recognized constraint keys and their typed values (spec.md §4.3 step 3).
///
/// Unknown keys found in a raw config/JSON map are preserved in `extra` so
/// round-tripping an Intent never silently drops operator-authored data, but
/// only the named fields below are consulted by the Governor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drafts_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_recipients: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_clawdbot_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_clawdbot_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_irreversible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalate_risk_levels: Option<Vec<RiskLevel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_level: Option<AuditLevel>,
}

/// Granularity of the action snapshot the Auditor captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Detailed,
    Redacted,
}

/// A tenant-scoped contract describing permissible tools, ops, constraints,
/// and risk posture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Intent {
    pub intent_id: IntentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub objective: String,
    pub scope: Scope,
    #[serde(default)]
    pub constraints: Constraints,
    pub risk_level: RiskLevel,
    pub approved_by_user: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    /// Build a new, unsaved intent. `intent_id` is generated by the Store on
    /// first save unless the caller already has a stable one to upsert under.
    #[must_use]
    pub fn new(objective: impl Into<String>, risk_level: RiskLevel) -> Self {
        let now = Utc::now();
        Self {
            intent_id: IntentId::new(uuid::Uuid::new_v4().to_string()),
            tenant_id: None,
            objective: objective.into(),
            scope: Scope::new(),
            constraints: Constraints::default(),
            risk_level,
            approved_by_user: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthesize a minimal, non-approved intent permitting only the given
    /// `(tool, op)` pair. Used by the Pipeline's intent-resolution fallback,
    /// and only ever for read ops per spec.md §4.8 step 1.
    #[must_use]
    pub fn synthesize_read_only(tool: &str, op: &str) -> Self {
        let mut intent = Self::new("ad-hoc read access", RiskLevel::Low);
        intent.scope.insert(tool.to_owned(), vec![op.to_owned()]);
        intent
    }

    /// Whether `tool`/`op` appears in this intent's scope.
    #[must_use]
    pub fn allows(&self, tool: &str, op: &str) -> bool {
        self.scope
            .get(tool)
            .is_some_and(|ops| ops.iter().any(|o| o == op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_intent_is_read_only_and_unapproved() {
        let intent = Intent::synthesize_read_only("email", "read");
        assert!(!intent.approved_by_user);
        assert!(intent.allows("email", "read"));
        assert!(!intent.allows("email", "send"));
    }

    #[test]
    fn new_intent_has_empty_scope() {
        let intent = Intent::new("test", RiskLevel::Low);
        assert!(intent.scope.is_empty());
        assert!(!intent.approved_by_user);
    }
}
