use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActionFingerprint, DecisionId};

/// The verdict the Governor assigns to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Allow,
    Degrade,
    Escalate,
    Block,
    Pause,
}

impl Verdict {
    /// Whether an executable `execution` block may accompany this verdict.
    #[must_use]
    pub fn is_executable(self) -> bool {
        matches!(self, Self::Allow | Self::Degrade)
    }
}

/// Closed enum of reason codes. Each verdict determines which codes are valid
/// for it; see [`ReasonCode::matches_verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ReasonCode {
    Approved,
    DegradedToSafeAlternative,
    NeedConfirmation,
    IntentNotApproved,
    ScopeViolation,
    RiskTooHigh,
    DataExfil,
    OutOfHours,
    LoopDetected,
    RateLimit,
}

impl ReasonCode {
    /// True iff this reason code is one that the named verdict is allowed to
    /// carry, per the spec's verdict/reason-code table.
    #[must_use]
    pub fn matches_verdict(self, verdict: Verdict) -> bool {
        match verdict {
            Verdict::Allow => matches!(self, Self::Approved),
            Verdict::Degrade => matches!(self, Self::DegradedToSafeAlternative),
            Verdict::Escalate => matches!(self, Self::NeedConfirmation | Self::IntentNotApproved),
            Verdict::Block => matches!(
                self,
                Self::ScopeViolation | Self::RiskTooHigh | Self::DataExfil | Self::OutOfHours
            ),
            Verdict::Pause => matches!(self, Self::LoopDetected | Self::RateLimit),
        }
    }
}

/// A confirmation option offered as part of an [`Escalation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EscalationOption {
    pub id: String,
    pub label: String,
}

impl EscalationOption {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A confirmation question attached to an ESCALATE verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Escalation {
    pub question: String,
    pub options: Vec<EscalationOption>,
}

/// A safe alternative op offered as part of a DEGRADE verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SafeAlternative {
    pub op: String,
}

/// The immutable result of evaluating an [`crate::action::Action`] against an
/// [`crate::intent::Intent`] and [`crate::context::GovernorContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Decision {
    pub decision_id: DecisionId,
    pub action_fingerprint: ActionFingerprint,
    pub verdict: Verdict,
    pub reason_code: ReasonCode,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_alternative: Option<SafeAlternative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    /// The risk level the Governor computed, retained for audit even though
    /// only `reason_code`/`verdict` drive behavior downstream.
    pub computed_risk: crate::intent::RiskLevel,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    /// Invariant check used by tests and by the Auditor before persisting:
    /// `reason_code == Approved` iff `verdict == Allow`; `safe_alternative`
    /// present iff `verdict == Degrade`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if !self.reason_code.matches_verdict(self.verdict) {
            return false;
        }
        let degrade_consistent =
            (self.verdict == Verdict::Degrade) == self.safe_alternative.is_some();
        let allow_consistent = (self.verdict == Verdict::Allow)
            == (self.reason_code == ReasonCode::Approved);
        degrade_consistent && allow_consistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_requires_approved() {
        assert!(ReasonCode::Approved.matches_verdict(Verdict::Allow));
        assert!(!ReasonCode::ScopeViolation.matches_verdict(Verdict::Allow));
    }

    #[test]
    fn decision_well_formed_allow() {
        let d = Decision {
            decision_id: DecisionId::generate(),
            action_fingerprint: ActionFingerprint::from("fp"),
            verdict: Verdict::Allow,
            reason_code: ReasonCode::Approved,
            explanation: "ok".into(),
            safe_alternative: None,
            escalation: None,
            computed_risk: crate::intent::RiskLevel::Low,
            timestamp: Utc::now(),
        };
        assert!(d.is_well_formed());
    }

    #[test]
    fn decision_malformed_degrade_without_alternative() {
        let d = Decision {
            decision_id: DecisionId::generate(),
            action_fingerprint: ActionFingerprint::from("fp"),
            verdict: Verdict::Degrade,
            reason_code: ReasonCode::DegradedToSafeAlternative,
            explanation: "ok".into(),
            safe_alternative: None,
            escalation: None,
            computed_risk: crate::intent::RiskLevel::Low,
            timestamp: Utc::now(),
        };
        assert!(!d.is_well_formed());
    }

    #[test]
    fn verdict_executable() {
        assert!(Verdict::Allow.is_executable());
        assert!(Verdict::Degrade.is_executable());
        assert!(!Verdict::Block.is_executable());
        assert!(!Verdict::Escalate.is_executable());
        assert!(!Verdict::Pause.is_executable());
    }
}
