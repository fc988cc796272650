use chrono::{DateTime, Utc};
use edon_core::{
    compute_fingerprint, Action, Decision, DecisionId, GovernorContext, Intent, ReasonCode,
    Verdict,
};

use crate::{approval, constraints, loop_detection, risk, scope};

/// Evaluates an `(intent, action, context)` triple into a [`Decision`],
/// following the five-step flow: risk computation, scope check, constraint
/// checks, approval gate, loop/rate detection. Pure and deterministic modulo
/// `now` and `recent_decision_timestamps`, both supplied by the caller so
/// this function performs no I/O.
#[must_use]
pub fn decide(
    intent: &Intent,
    action: &Action,
    context: &GovernorContext,
    now: DateTime<Utc>,
    recent_decision_timestamps: &[DateTime<Utc>],
) -> Decision {
    let computed_risk = risk::compute_risk(action, intent);
    let fingerprint = compute_fingerprint(action, &intent.intent_id);

    if let Some((verdict, reason_code)) = scope::check_scope(action, intent, computed_risk) {
        return finalize(fingerprint, verdict, reason_code, None, None, computed_risk, now);
    }

    if let Some(outcome) = constraints::apply_constraints(action, intent, context, computed_risk, now) {
        return finalize(
            fingerprint,
            outcome.verdict,
            outcome.reason_code,
            outcome.safe_alternative,
            outcome.escalation,
            computed_risk,
            now,
        );
    }

    if let Some((verdict, reason_code)) = approval::check_approval(action, intent, computed_risk) {
        return finalize(fingerprint, verdict, reason_code, None, None, computed_risk, now);
    }

    if loop_detection::is_loop_detected(
        recent_decision_timestamps,
        now,
        loop_detection::DEFAULT_THRESHOLD,
        loop_detection::DEFAULT_WINDOW_SECONDS,
    ) {
        return finalize(
            fingerprint,
            Verdict::Pause,
            ReasonCode::LoopDetected,
            None,
            None,
            computed_risk,
            now,
        );
    }

    finalize(
        fingerprint,
        Verdict::Allow,
        ReasonCode::Approved,
        None,
        None,
        computed_risk,
        now,
    )
}

#[allow(clippy::too_many_arguments)]
fn finalize(
    fingerprint: edon_core::ActionFingerprint,
    verdict: Verdict,
    reason_code: ReasonCode,
    safe_alternative: Option<edon_core::SafeAlternative>,
    escalation: Option<edon_core::Escalation>,
    computed_risk: edon_core::RiskLevel,
    now: DateTime<Utc>,
) -> Decision {
    let explanation = explain(verdict, reason_code);
    Decision {
        decision_id: DecisionId::generate(),
        action_fingerprint: fingerprint,
        verdict,
        reason_code,
        explanation,
        safe_alternative,
        escalation,
        computed_risk,
        timestamp: now,
    }
}

fn explain(verdict: Verdict, reason_code: ReasonCode) -> String {
    match (verdict, reason_code) {
        (Verdict::Allow, _) => "Action is within scope and approved.".to_owned(),
        (Verdict::Degrade, _) => "Action downgraded to a safer alternative operation.".to_owned(),
        (Verdict::Escalate, ReasonCode::IntentNotApproved) => {
            "Intent has not been approved by a user; confirmation required.".to_owned()
        }
        (Verdict::Escalate, _) => "Action requires explicit confirmation before proceeding.".to_owned(),
        (Verdict::Block, ReasonCode::RiskTooHigh) => {
            "Computed risk is critical; action blocked.".to_owned()
        }
        (Verdict::Block, ReasonCode::DataExfil) => {
            "Action reads data outside the intent's declared scope.".to_owned()
        }
        (Verdict::Block, ReasonCode::OutOfHours) => {
            "Action attempted outside the tenant's permitted working hours.".to_owned()
        }
        (Verdict::Block, _) => "Action is outside the intent's declared scope.".to_owned(),
        (Verdict::Pause, ReasonCode::LoopDetected) => {
            "Repeated identical action detected; execution paused.".to_owned()
        }
        (Verdict::Pause, _) => "Action paused pending rate-limit recovery.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edon_core::RiskLevel;

    fn approved_intent(tool: &str, op: &str) -> Intent {
        let mut intent = Intent::new("test", RiskLevel::Low);
        intent.approved_by_user = true;
        intent.scope.insert(tool.into(), vec![op.into()]);
        intent
    }

    #[test]
    fn benign_proxy_call_is_allowed() {
        let intent = approved_intent("clawdbot", "invoke");
        let action = Action::new("clawdbot", "invoke", serde_json::json!({"tool": "search"}));
        let decision = decide(&intent, &action, &GovernorContext::new(), Utc::now(), &[]);
        assert_eq!(decision.verdict, Verdict::Allow);
        assert!(decision.is_well_formed());
    }

    #[test]
    fn out_of_scope_action_is_blocked() {
        let intent = approved_intent("email", "send");
        let action = Action::new("filesystem", "delete", serde_json::Value::Null);
        let decision = decide(&intent, &action, &GovernorContext::new(), Utc::now(), &[]);
        assert_eq!(decision.verdict, Verdict::Block);
        assert!(decision.is_well_formed());
    }

    #[test]
    fn critical_shell_command_blocks_with_risk_too_high() {
        let intent = approved_intent("shell", "run");
        let action = Action::new("shell", "run", serde_json::json!({"cmd": "rm -rf /"}));
        let decision = decide(&intent, &action, &GovernorContext::new(), Utc::now(), &[]);
        assert_eq!(decision.verdict, Verdict::Block);
        assert_eq!(decision.reason_code, ReasonCode::RiskTooHigh);
    }

    #[test]
    fn recipient_escalation_then_allow_on_retry() {
        let mut intent = approved_intent("email", "send");
        intent.constraints.max_recipients = Some(1);
        let action = Action::new(
            "email",
            "send",
            serde_json::json!({"recipients": ["a@x.com", "b@x.com"]}),
        );
        let first = decide(&intent, &action, &GovernorContext::new(), Utc::now(), &[]);
        assert_eq!(first.verdict, Verdict::Escalate);

        let retry_ctx = GovernorContext::new().with_approval("allow_once");
        let second = decide(&intent, &action, &retry_ctx, Utc::now(), &[]);
        assert_eq!(second.verdict, Verdict::Allow);
    }

    #[test]
    fn loop_detection_pauses_repeated_action() {
        let intent = approved_intent("email", "read");
        let action = Action::new("email", "read", serde_json::Value::Null);
        let now = Utc::now();
        let history: Vec<_> = (0..5).map(|i| now - chrono::Duration::seconds(i)).collect();
        let decision = decide(&intent, &action, &GovernorContext::new(), now, &history);
        assert_eq!(decision.verdict, Verdict::Pause);
        assert_eq!(decision.reason_code, ReasonCode::LoopDetected);
    }

    #[test]
    fn unapproved_intent_escalates_before_loop_check() {
        let mut intent = Intent::new("test", RiskLevel::Low);
        intent.scope.insert("email".into(), vec!["send".into()]);
        let action = Action::new("email", "send", serde_json::Value::Null);
        let decision = decide(&intent, &action, &GovernorContext::new(), Utc::now(), &[]);
        assert_eq!(decision.verdict, Verdict::Escalate);
        assert_eq!(decision.reason_code, ReasonCode::IntentNotApproved);
    }

    #[test]
    fn decisions_are_deterministic_given_same_inputs_and_clock() {
        let intent = approved_intent("email", "read");
        let action = Action::new("email", "read", serde_json::Value::Null);
        let now = Utc::now();
        let a = decide(&intent, &action, &GovernorContext::new(), now, &[]);
        let b = decide(&intent, &action, &GovernorContext::new(), now, &[]);
        assert_eq!(a.verdict, b.verdict);
        assert_eq!(a.reason_code, b.reason_code);
        assert_eq!(a.action_fingerprint, b.action_fingerprint);
    }
}
