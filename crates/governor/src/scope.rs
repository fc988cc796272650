use edon_core::{Action, Intent, ReasonCode, RiskLevel, Verdict};

/// Step 2 of the decision flow: verify `action.tool`/`action.op` is declared
/// in `intent.scope`. Returns `Some((verdict, reason))` when the action must
/// be blocked outright; `None` when the action is in scope and evaluation
/// should continue to constraint checks.
///
/// When risk is already `critical`, risk dominates and `RISK_TOO_HIGH` wins
/// over any scope violation, matching the ordering in spec step 2. Every
/// other out-of-scope action reports `SCOPE_VIOLATION`.
#[must_use]
pub fn check_scope(
    action: &Action,
    intent: &Intent,
    computed_risk: RiskLevel,
) -> Option<(Verdict, ReasonCode)> {
    let in_scope = intent.allows(&action.tool, &action.op);

    if computed_risk == RiskLevel::Critical {
        return Some((Verdict::Block, ReasonCode::RiskTooHigh));
    }

    if in_scope {
        return None;
    }

    Some((Verdict::Block, ReasonCode::ScopeViolation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> Intent {
        let mut intent = Intent::new("test", RiskLevel::Low);
        intent.scope.insert("email".into(), vec!["send".into()]);
        intent
    }

    #[test]
    fn in_scope_action_passes() {
        let action = Action::new("email", "send", serde_json::Value::Null);
        assert_eq!(check_scope(&action, &intent(), RiskLevel::Low), None);
    }

    #[test]
    fn out_of_scope_write_is_scope_violation() {
        let action = Action::new("email", "delete", serde_json::Value::Null);
        assert_eq!(
            check_scope(&action, &intent(), RiskLevel::Low),
            Some((Verdict::Block, ReasonCode::ScopeViolation))
        );
    }

    #[test]
    fn out_of_scope_read_is_scope_violation() {
        let action = Action::new("email", "read", serde_json::Value::Null);
        assert_eq!(
            check_scope(&action, &intent(), RiskLevel::Low),
            Some((Verdict::Block, ReasonCode::ScopeViolation))
        );
    }

    #[test]
    fn critical_risk_dominates_even_in_scope() {
        let action = Action::new("email", "send", serde_json::Value::Null);
        assert_eq!(
            check_scope(&action, &intent(), RiskLevel::Critical),
            Some((Verdict::Block, ReasonCode::RiskTooHigh))
        );
    }
}
