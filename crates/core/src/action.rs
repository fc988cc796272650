use serde::{Deserialize, Serialize};

use crate::intent::RiskLevel;

/// A concrete request to invoke `(tool, op, params)`.
///
/// `estimated_risk` is advisory and supplied by the caller; the Governor
/// always recomputes `computed_risk` server-side and never trusts the
/// caller's estimate for decisions (spec.md §3, Action entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Action {
    pub tool: String,
    pub op: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub params: serde_json::Value,
    #[serde(default)]
    pub estimated_risk: Option<RiskLevel>,
}

impl Action {
    #[must_use]
    pub fn new(tool: impl Into<String>, op: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            op: op.into(),
            params,
            estimated_risk: None,
        }
    }

    #[must_use]
    pub fn with_estimated_risk(mut self, risk: RiskLevel) -> Self {
        self.estimated_risk = Some(risk);
        self
    }

    /// Number of recipients declared in `params.recipients`, if that field is
    /// present and an array; used by the recipient-count risk/constraint
    /// rules. Also recognizes a single `params.to` string as one recipient.
    #[must_use]
    pub fn recipient_count(&self) -> Option<usize> {
        if let Some(arr) = self.params.get("recipients").and_then(|v| v.as_array()) {
            return Some(arr.len());
        }
        if self.params.get("to").is_some() {
            return Some(1);
        }
        None
    }

    /// True if `op` falls in the "send"-class family the spec treats
    /// uniformly for recipient-count escalation (`send`, `create_event`,
    /// `create_issue`).
    #[must_use]
    pub fn is_send_class(&self) -> bool {
        matches!(self.op.as_str(), "send" | "create_event" | "create_issue")
    }

    /// True if `op` is a read-only operation (never causes a side effect).
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self.op.as_str(), "read" | "list" | "get" | "search" | "summarize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_count_from_array() {
        let action = Action::new(
            "email",
            "send",
            serde_json::json!({"recipients": ["a@x.com", "b@x.com"]}),
        );
        assert_eq!(action.recipient_count(), Some(2));
    }

    #[test]
    fn recipient_count_from_single_to() {
        let action = Action::new("email", "send", serde_json::json!({"to": "a@x.com"}));
        assert_eq!(action.recipient_count(), Some(1));
    }

    #[test]
    fn recipient_count_absent() {
        let action = Action::new("shell", "run", serde_json::json!({"cmd": "ls"}));
        assert_eq!(action.recipient_count(), None);
    }

    #[test]
    fn is_send_class_matches_named_ops() {
        assert!(Action::new("email", "send", serde_json::Value::Null).is_send_class());
        assert!(Action::new("calendar", "create_event", serde_json::Value::Null).is_send_class());
        assert!(!Action::new("email", "draft", serde_json::Value::Null).is_send_class());
    }

    #[test]
    fn is_read_matches_known_read_ops() {
        assert!(Action::new("email", "read", serde_json::Value::Null).is_read());
        assert!(!Action::new("email", "send", serde_json::Value::Null).is_read());
    }
}
