use edon_core::{Action, Intent, ReasonCode, RiskLevel, Verdict};

/// Step 4 of the decision flow: the approval gate. If the intent has not
/// been approved by a user, any action that would otherwise ALLOW with a
/// side effect (a non-`read` op, or `computed_risk >= medium`) must instead
/// ESCALATE with `INTENT_NOT_APPROVED`.
#[must_use]
pub fn check_approval(
    action: &Action,
    intent: &Intent,
    computed_risk: RiskLevel,
) -> Option<(Verdict, ReasonCode)> {
    if intent.approved_by_user {
        return None;
    }
    let has_side_effect = !action.is_read() || computed_risk >= RiskLevel::Medium;
    if has_side_effect {
        Some((Verdict::Escalate, ReasonCode::IntentNotApproved))
    } else {
        None
    }
}
