use edon_core::{CredentialHandle, GovernorContext};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::Value;

use crate::connector::Connector;
use crate::error::ConnectorError;

/// `draft` writes to an in-memory sandbox (never touches SMTP); `send`
/// performs a real dispatch and attaches `{verified, message_id}`
/// (spec.md §4.9 EmailConnector).
pub struct EmailConnector;

impl EmailConnector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build_message(params: &Value, from: &str) -> Result<Message, ConnectorError> {
        let to = params
            .get("to")
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectorError::ExecutionFailed("missing required field: to".into()))?;
        let subject = params.get("subject").and_then(Value::as_str).unwrap_or("(no subject)");
        let body = params.get("body").and_then(Value::as_str).unwrap_or("");

        Message::builder()
            .from(from.parse().map_err(|e| ConnectorError::Configuration(format!("{e}")))?)
            .to(to.parse().map_err(|e| ConnectorError::ExecutionFailed(format!("invalid recipient: {e}")))?)
            .subject(subject)
            .body(body.to_owned())
            .map_err(|e| ConnectorError::Serialization(e.to_string()))
    }
}

impl Default for EmailConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for EmailConnector {
    fn tool(&self) -> &str {
        "email"
    }

    async fn dispatch(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        _context: &GovernorContext,
    ) -> Result<Value, ConnectorError> {
        match op {
            "draft" => Ok(serde_json::json!({
                "to": params.get("to"),
                "subject": params.get("subject"),
                "body": params.get("body"),
                "drafted": true,
            })),
            "send" => {
                let credential = credential.ok_or_else(|| ConnectorError::MissingCredential("email".into()))?;
                let smtp_host = credential
                    .payload
                    .get("smtp_host")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ConnectorError::Configuration("missing smtp_host".into()))?;
                let smtp_user = credential.payload.get("smtp_user").and_then(Value::as_str).unwrap_or("");
                let smtp_password = credential.payload.get("smtp_password").and_then(Value::as_str).unwrap_or("");
                let from = credential.payload.get("from").and_then(Value::as_str).unwrap_or(smtp_user);

                let message = Self::build_message(params, from)?;

                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                    .map_err(|e| ConnectorError::Configuration(e.to_string()))?
                    .credentials(Credentials::new(smtp_user.to_owned(), smtp_password.to_owned()))
                    .build();

                let response = transport
                    .send(message)
                    .await
                    .map_err(|e| ConnectorError::Connection(e.to_string()))?;

                let message_id = response.message().next().cloned().unwrap_or_default();
                Ok(serde_json::json!({
                    "sent": true,
                    "message_id": message_id,
                }))
            }
            other => Err(ConnectorError::ExecutionFailed(format!("unsupported op: {other}"))),
        }
    }

    fn observe(&self, op: &str, result: &Value) -> Option<Value> {
        if op != "send" {
            return None;
        }
        Some(serde_json::json!({
            "verified": result.get("sent").cloned().unwrap_or(Value::Bool(false)),
            "message_id": result.get("message_id").cloned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn draft_never_contacts_smtp() {
        let connector = EmailConnector::new();
        let result = connector
            .dispatch(
                "draft",
                &serde_json::json!({"to": "a@x.com", "subject": "hi", "body": "hello"}),
                None,
                &GovernorContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(result["drafted"], true);
    }

    #[tokio::test]
    async fn send_without_credential_fails_closed() {
        let connector = EmailConnector::new();
        let err = connector
            .dispatch("send", &serde_json::json!({"to": "a@x.com"}), None, &GovernorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MissingCredential(_)));
    }

    #[test]
    fn draft_observe_has_no_confirmation() {
        let connector = EmailConnector::new();
        assert!(connector.observe("draft", &serde_json::json!({"drafted": true})).is_none());
    }
}
