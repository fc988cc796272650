use edon_core::{CredentialHandle, GovernorContext};
use reqwest::Client;
use serde_json::Value;

use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::http::default_client;

/// Forwards `clawdbot invoke` calls to a configured downstream bot-gateway
/// URL, bearing `Authorization: Bearer <secret>` from the tool's
/// [`CredentialHandle`] (spec.md §4.9 RemoteBotProxy).
pub struct RemoteBotProxy {
    base_url: String,
    client: Client,
}

impl RemoteBotProxy {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: default_client(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

impl Connector for RemoteBotProxy {
    fn tool(&self) -> &str {
        "clawdbot"
    }

    async fn dispatch(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        _context: &GovernorContext,
    ) -> Result<Value, ConnectorError> {
        if op != "invoke" {
            return Err(ConnectorError::ExecutionFailed(format!("unsupported op: {op}")));
        }

        let secret = credential
            .and_then(|c| c.payload.get("secret"))
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectorError::MissingCredential("clawdbot".into()))?;

        let body = serde_json::json!({
            "tool": params.get("tool"),
            "action": params.get("action"),
            "args": params.get("args").cloned().unwrap_or(Value::Null),
            "sessionKey": params.get("sessionKey"),
        });

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ConnectorError::Timeout(std::time::Duration::from_secs(0))
                } else if e.is_connect() {
                    ConnectorError::Connection(e.to_string())
                } else {
                    ConnectorError::ExecutionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let downstream: Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({"status_code": status.as_u16()}));

        if !status.is_success() {
            let message = downstream
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("downstream error")
                .to_owned();
            return Err(ConnectorError::ExecutionFailed(message));
        }

        Ok(downstream)
    }

    fn observe(&self, _op: &str, result: &Value) -> Option<Value> {
        result.get("verified").map(|v| serde_json::json!({"verified": v}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_is_registered_under_clawdbot() {
        let proxy = RemoteBotProxy::new("https://bot.internal/invoke");
        assert_eq!(proxy.tool(), "clawdbot");
    }

    #[tokio::test]
    async fn rejects_unsupported_op() {
        let proxy = RemoteBotProxy::new("https://bot.internal/invoke");
        let err = proxy
            .dispatch("sessions_delete", &serde_json::Value::Null, None, &GovernorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn requires_credential() {
        let proxy = RemoteBotProxy::new("https://bot.internal/invoke");
        let err = proxy
            .dispatch("invoke", &serde_json::json!({}), None, &GovernorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MissingCredential(_)));
    }
}
