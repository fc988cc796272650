pub mod action;
pub mod audit;
pub mod context;
pub mod counter;
pub mod credential;
pub mod decision;
pub mod error;
pub mod fingerprint;
pub mod intent;
pub mod principal;
pub mod tenant;
pub mod types;

pub use action::Action;
pub use audit::AuditEvent;
pub use context::GovernorContext;
pub use counter::{CounterKey, WindowGranularity};
pub use credential::{Credential, CredentialHandle, CredentialType, IntegrationStatus};
pub use decision::{Decision, Escalation, EscalationOption, ReasonCode, SafeAlternative, Verdict};
pub use error::CoreError;
pub use fingerprint::compute_fingerprint;
pub use intent::{AuditLevel, Constraints, Intent, RiskLevel, Scope};
pub use principal::Principal;
pub use tenant::{Tenant, TenantStatus};
pub use types::{
    ActionFingerprint, AgentId, CredentialId, DecisionId, EventId, IntentId, TenantId,
};
