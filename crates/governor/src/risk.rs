use edon_core::{Action, Intent, RiskLevel};

const CRITICAL_SUBSTRINGS: &[&str] = &["rm -rf", "DROP TABLE", "; rm ", "mkfs", "dd if="];

/// Step 1 of the decision flow: compute the actual risk level for `action`
/// under `intent`, escalating past `action.estimated_risk` when any of the
/// named critical- or high-risk patterns hold. `estimated_risk` itself is
/// never trusted for decisions — only retained on the resulting `Decision`
/// for audit.
#[must_use]
pub fn compute_risk(action: &Action, intent: &Intent) -> RiskLevel {
    let base = action.estimated_risk.unwrap_or(RiskLevel::Low);

    if is_critical(action, intent) {
        return RiskLevel::Critical;
    }
    if is_high(action, intent) {
        return base.max(RiskLevel::High);
    }
    base
}

fn is_critical(action: &Action, intent: &Intent) -> bool {
    if action.tool == "shell" && action.op == "run" {
        return true;
    }
    if contains_critical_substring(&action.params) {
        return true;
    }
    if action.tool == "filesystem"
        && matches!(action.op.as_str(), "delete" | "write")
        && targets_outside_sandbox(action)
    {
        return true;
    }
    if action.is_send_class() {
        let max_recipients = intent.constraints.max_recipients;
        if max_recipients.is_none() && action.recipient_count().is_some_and(|n| n > 1) {
            return true;
        }
    }
    false
}

fn is_high(action: &Action, intent: &Intent) -> bool {
    if !action.is_send_class() {
        return false;
    }
    let Some(max) = intent.constraints.max_recipients else {
        return false;
    };
    action
        .recipient_count()
        .is_some_and(|n| n > max as usize)
}

fn contains_critical_substring(params: &serde_json::Value) -> bool {
    match params {
        serde_json::Value::String(s) => CRITICAL_SUBSTRINGS.iter().any(|needle| s.contains(needle)),
        serde_json::Value::Object(map) => map.values().any(contains_critical_substring),
        serde_json::Value::Array(items) => items.iter().any(contains_critical_substring),
        _ => false,
    }
}

/// Whether a filesystem action's `params.path` escapes the declared sandbox
/// root (`params.sandbox_root`, defaulting to `/` meaning "no declared
/// sandbox", in which case any absolute path outside the current working
/// directory convention is treated as out-of-sandbox).
fn targets_outside_sandbox(action: &Action) -> bool {
    let Some(path) = action.params.get("path").and_then(|v| v.as_str()) else {
        return false;
    };
    let sandbox_root = action
        .params
        .get("sandbox_root")
        .and_then(|v| v.as_str())
        .unwrap_or("/sandbox");
    !path.starts_with(sandbox_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> Intent {
        let mut intent = Intent::new("test", RiskLevel::Low);
        intent.scope.insert("shell".into(), vec!["run".into()]);
        intent.scope.insert("filesystem".into(), vec!["delete".into(), "write".into()]);
        intent.scope.insert("email".into(), vec!["send".into()]);
        intent
    }

    #[test]
    fn shell_run_is_always_critical() {
        let action = Action::new("shell", "run", serde_json::json!({"cmd": "ls"}));
        assert_eq!(compute_risk(&action, &intent()), RiskLevel::Critical);
    }

    #[test]
    fn dangerous_substring_is_critical() {
        let action = Action::new("shell", "exec", serde_json::json!({"cmd": "rm -rf /"}));
        assert_eq!(compute_risk(&action, &intent()), RiskLevel::Critical);
    }

    #[test]
    fn filesystem_delete_outside_sandbox_is_critical() {
        let action = Action::new(
            "filesystem",
            "delete",
            serde_json::json!({"path": "/etc/passwd", "sandbox_root": "/sandbox"}),
        );
        assert_eq!(compute_risk(&action, &intent()), RiskLevel::Critical);
    }

    #[test]
    fn filesystem_delete_inside_sandbox_is_not_escalated() {
        let action = Action::new(
            "filesystem",
            "delete",
            serde_json::json!({"path": "/sandbox/tmp.txt", "sandbox_root": "/sandbox"}),
        );
        assert_eq!(compute_risk(&action, &intent()), RiskLevel::Low);
    }

    #[test]
    fn unset_max_recipients_with_multiple_recipients_is_critical() {
        let action = Action::new(
            "email",
            "send",
            serde_json::json!({"recipients": ["a@x.com", "b@x.com"]}),
        );
        assert_eq!(compute_risk(&action, &intent()), RiskLevel::Critical);
    }

    #[test]
    fn recipients_over_declared_max_is_high() {
        let mut i = intent();
        i.constraints.max_recipients = Some(1);
        let action = Action::new(
            "email",
            "send",
            serde_json::json!({"recipients": ["a@x.com", "b@x.com"]}),
        );
        assert_eq!(compute_risk(&action, &i), RiskLevel::High);
    }

    #[test]
    fn recipients_within_max_is_not_escalated() {
        let mut i = intent();
        i.constraints.max_recipients = Some(5);
        let action = Action::new("email", "send", serde_json::json!({"recipients": ["a@x.com"]}));
        assert_eq!(compute_risk(&action, &i), RiskLevel::Low);
    }
}
