use chrono::{DateTime, Timelike, Utc};
use edon_core::{
    Action, Escalation, EscalationOption, GovernorContext, Intent, ReasonCode, RiskLevel,
    SafeAlternative, Verdict,
};

/// Outcome of the constraint checks (spec step 3): either a final,
/// determinate decision, or `None` meaning no recognized constraint fired
/// and evaluation should continue to the approval gate.
pub struct ConstraintOutcome {
    pub verdict: Verdict,
    pub reason_code: ReasonCode,
    pub safe_alternative: Option<SafeAlternative>,
    pub escalation: Option<Escalation>,
}

impl ConstraintOutcome {
    fn block(reason_code: ReasonCode) -> Self {
        Self {
            verdict: Verdict::Block,
            reason_code,
            safe_alternative: None,
            escalation: None,
        }
    }

    fn degrade_to_draft() -> Self {
        Self {
            verdict: Verdict::Degrade,
            reason_code: ReasonCode::DegradedToSafeAlternative,
            safe_alternative: Some(SafeAlternative { op: "draft".into() }),
            escalation: None,
        }
    }

    fn allow() -> Self {
        Self {
            verdict: Verdict::Allow,
            reason_code: ReasonCode::Approved,
            safe_alternative: None,
            escalation: None,
        }
    }

    fn escalate(reason_code: ReasonCode, question: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Escalate,
            reason_code,
            safe_alternative: None,
            escalation: Some(Escalation {
                question: question.into(),
                options: vec![
                    EscalationOption::new("allow_once", "Allow this one time"),
                    EscalationOption::new("draft_only", "Prepare as a draft instead"),
                    EscalationOption::new("keep_blocking", "Keep blocking this action"),
                ],
            }),
        }
    }
}

/// Step 3 of the decision flow: evaluate all seven recognized constraint
/// keys in the order the spec table lists them, short-circuiting on the
/// first that determines a verdict.
#[must_use]
pub fn apply_constraints(
    action: &Action,
    intent: &Intent,
    context: &GovernorContext,
    computed_risk: RiskLevel,
    now: DateTime<Utc>,
) -> Option<ConstraintOutcome> {
    let constraints = &intent.constraints;

    if action.tool == "clawdbot" && action.op == "invoke" {
        if let Some(inner_tool) = action.params.get("tool").and_then(|v| v.as_str()) {
            if let Some(blocked) = &constraints.blocked_clawdbot_tools {
                if blocked.iter().any(|t| t == inner_tool) {
                    return Some(ConstraintOutcome::block(ReasonCode::ScopeViolation));
                }
            }
            if let Some(allowed) = &constraints.allowed_clawdbot_tools {
                if !allowed.iter().any(|t| t == inner_tool) {
                    return Some(ConstraintOutcome::block(ReasonCode::ScopeViolation));
                }
            }
        }
    }

    if constraints.drafts_only == Some(true) && action.op == "send" {
        return Some(ConstraintOutcome::degrade_to_draft());
    }

    if let Some(max) = constraints.max_recipients {
        if action
            .recipient_count()
            .is_some_and(|n| n > max as usize)
        {
            if context.has_approval("allow_once") {
                return Some(ConstraintOutcome::allow());
            }
            return Some(ConstraintOutcome::escalate(
                ReasonCode::NeedConfirmation,
                format!(
                    "This action targets more than {max} recipients. Proceed anyway?"
                ),
            ));
        }
    }

    if constraints.confirm_irreversible == Some(true)
        && computed_risk >= RiskLevel::High
        && !context.has_approval("allow_once")
    {
        return Some(ConstraintOutcome::escalate(
            ReasonCode::NeedConfirmation,
            "This action is irreversible and high-risk. Confirm to proceed?",
        ));
    }

    if constraints.work_hours_only == Some(true) && !is_within_work_hours(now) {
        return Some(ConstraintOutcome::block(ReasonCode::OutOfHours));
    }

    if let Some(levels) = &constraints.escalate_risk_levels {
        if levels.contains(&computed_risk) && !context.has_approval("allow_once") {
            return Some(ConstraintOutcome::escalate(
                ReasonCode::NeedConfirmation,
                "This action's risk level requires confirmation. Proceed?",
            ));
        }
    }

    None
}

/// Whether `now` falls within 09:00–18:00, tenant-local. Tenants have no
/// stored UTC offset in this gateway, so "tenant-local" is treated as UTC.
fn is_within_work_hours(now: DateTime<Utc>) -> bool {
    let hour = now.hour();
    (9..18).contains(&hour)
}
