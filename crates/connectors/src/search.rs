use edon_core::{CredentialHandle, GovernorContext};
use reqwest::Client;
use serde_json::Value;

use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::http::default_client;

/// Read-only `search` connector dispatching queries to a configured search
/// API (spec.md §4.9: "Additional connectors (search, calendar, TTS, VCS)
/// follow the same contract").
pub struct SearchConnector {
    endpoint: String,
    client: Client,
}

impl SearchConnector {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: default_client(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

impl Connector for SearchConnector {
    fn tool(&self) -> &str {
        "search"
    }

    async fn dispatch(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        _context: &GovernorContext,
    ) -> Result<Value, ConnectorError> {
        if op != "search" {
            return Err(ConnectorError::ExecutionFailed(format!("unsupported op: {op}")));
        }
        let query = params
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectorError::ExecutionFailed("missing required field: query".into()))?;

        let mut request = self.client.get(&self.endpoint).query(&[("q", query)]);
        if let Some(api_key) = credential.and_then(|c| c.payload.get("api_key")).and_then(Value::as_str) {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ConnectorError::Timeout(std::time::Duration::from_secs(0))
            } else if e.is_connect() {
                ConnectorError::Connection(e.to_string())
            } else {
                ConnectorError::ExecutionFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ConnectorError::ExecutionFailed(format!("search API returned {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| ConnectorError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_under_search() {
        assert_eq!(SearchConnector::new("https://search.internal/query").tool(), "search");
    }

    #[tokio::test]
    async fn rejects_unsupported_op() {
        let connector = SearchConnector::new("https://search.internal/query");
        let err = connector
            .dispatch("reindex", &serde_json::json!({}), None, &GovernorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn rejects_missing_query() {
        let connector = SearchConnector::new("https://search.internal/query");
        let err = connector
            .dispatch("search", &serde_json::json!({}), None, &GovernorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
    }
}
