use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AgentId;

/// A token's binding record: the hash of the bearer token and the single
/// agent identity it has been bound to (spec.md §3, Principal entity;
/// §4.7 token binding — "a token may bind to at most one agent_id, fixed
/// on first use").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Principal {
    pub token_hash: String,
    pub agent_id: AgentId,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl Principal {
    #[must_use]
    pub fn bind(token_hash: impl Into<String>, agent_id: AgentId) -> Self {
        let now = Utc::now();
        Self {
            token_hash: token_hash.into(),
            agent_id,
            created_at: now,
            last_used_at: now,
        }
    }

    /// Check an incoming `agent_id` (from the optional `X-EDON-Agent-Id`
    /// header) against this binding. A request with no declared agent id
    /// never conflicts; the binding only needs to agree when both are known.
    #[must_use]
    pub fn accepts(&self, claimed_agent_id: Option<&AgentId>) -> bool {
        match claimed_agent_id {
            Some(agent_id) => agent_id == &self.agent_id,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_accepts_matching_agent() {
        let agent = AgentId::from("agent-1");
        let principal = Principal::bind("hash", agent.clone());
        assert!(principal.accepts(Some(&agent)));
        assert!(principal.accepts(None));
    }

    #[test]
    fn binding_rejects_mismatched_agent() {
        let principal = Principal::bind("hash", AgentId::from("agent-1"));
        let other = AgentId::from("agent-2");
        assert!(!principal.accepts(Some(&other)));
    }
}
