use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! newtype_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string as this identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype_id!(TenantId, "Opaque tenant identifier.");
newtype_id!(IntentId, "Opaque, stable identifier for an Intent, unique within the store.");
newtype_id!(DecisionId, "Opaque identifier for a Decision, always prefixed `dec-` when generated.");
newtype_id!(EventId, "Opaque identifier for an AuditEvent.");
newtype_id!(CredentialId, "Opaque identifier for a Credential.");
newtype_id!(AgentId, "Opaque identifier for an agent bound to a token.");
newtype_id!(ActionFingerprint, "Canonical hash of `tool|op|params|intent_id` used for loop/rate detection.");

impl DecisionId {
    /// Generate a fresh decision id with the conventional `dec-` prefix.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("dec-{}", uuid::Uuid::new_v4()))
    }
}

impl EventId {
    /// Generate a fresh, time-ordered event id (UUIDv7).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_roundtrip() {
        let t = TenantId::from("tenant-1");
        assert_eq!(t.as_str(), "tenant-1");
        assert_eq!(t.to_string(), "tenant-1");
    }

    #[test]
    fn decision_id_has_prefix() {
        let id = DecisionId::generate();
        assert!(id.as_str().starts_with("dec-"));
    }

    #[test]
    fn event_id_is_v7_formatted() {
        let id = EventId::generate();
        assert_eq!(id.as_str().len(), 36);
    }
}
