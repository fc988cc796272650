use serde::{Deserialize, Serialize};

use crate::types::{AgentId, TenantId};

/// Context supplied alongside an [`crate::action::Action`] when calling the
/// Governor (spec.md §4.3: `context = {agent_id?, tenant_id?, session_id?,
/// approvals[]}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GovernorContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub approvals: Vec<String>,
}

impl GovernorContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    #[must_use]
    pub fn with_approval(mut self, approval: impl Into<String>) -> Self {
        self.approvals.push(approval.into());
        self
    }

    /// Whether the given approval token was supplied, e.g. `allow_once`.
    #[must_use]
    pub fn has_approval(&self, token: &str) -> bool {
        self.approvals.iter().any(|a| a == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_approval_checks_membership() {
        let ctx = GovernorContext::new().with_approval("allow_once");
        assert!(ctx.has_approval("allow_once"));
        assert!(!ctx.has_approval("deny"));
    }
}
