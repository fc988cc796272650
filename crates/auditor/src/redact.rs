//! Redaction of action parameters for the `AuditEvent.action_snapshot` field.
//!
//! Unlike the field list the Redactor historically took as configuration,
//! spec.md §4.4 exposes only a single binary toggle per intent
//! (`constraints.audit_level: detailed | redacted`). The set of field names
//! considered sensitive is therefore fixed rather than operator-supplied.

use edon_core::AuditLevel;

const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "api_key",
    "apikey",
    "secret",
    "credential",
    "credentials",
    "authorization",
    "access_token",
    "refresh_token",
    "private_key",
    "ssn",
];

const PLACEHOLDER: &str = "[REDACTED]";

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_FIELDS.iter().any(|f| *f == key)
}

fn redact_in_place(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                if is_sensitive(&key) {
                    if let Some(v) = map.get_mut(&key) {
                        *v = serde_json::Value::String(PLACEHOLDER.to_owned());
                    }
                } else if let Some(v) = map.get_mut(&key) {
                    redact_in_place(v);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr {
                redact_in_place(item);
            }
        }
        _ => {}
    }
}

/// Build the `action_snapshot` value to persist, honoring `audit_level`.
/// `AuditLevel::Detailed` snapshots `params` verbatim; anything else
/// (including the default, absent constraint) redacts sensitive fields.
#[must_use]
pub fn snapshot_params(params: &serde_json::Value, audit_level: Option<AuditLevel>) -> serde_json::Value {
    if audit_level == Some(AuditLevel::Detailed) {
        return params.clone();
    }
    let mut redacted = params.clone();
    redact_in_place(&mut redacted);
    redacted
}
