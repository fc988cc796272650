use serde::{Deserialize, Serialize};

use crate::types::{IntentId, TenantId};

/// Operational state of a tenant. Only `Active` tenants may cause executions
/// (spec.md §3, Tenant entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
    Suspended,
}

impl TenantStatus {
    #[must_use]
    pub fn can_execute(self) -> bool {
        matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub plan: String,
    pub status: TenantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_intent_id: Option<IntentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_can_execute() {
        assert!(TenantStatus::Active.can_execute());
        assert!(!TenantStatus::Inactive.can_execute());
        assert!(!TenantStatus::Suspended.can_execute());
    }
}
