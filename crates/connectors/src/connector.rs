use async_trait::async_trait;
use edon_core::{CredentialHandle, GovernorContext};
use serde_json::Value;

use crate::error::ConnectorError;
use crate::outcome::ConnectorOutcome;

/// Strongly-typed connector trait with native `async fn`.
///
/// Not object-safe (native `async fn` desugars to an opaque `impl Future`);
/// implementors get dynamic dispatch for free via the [`DynConnector`]
/// blanket implementation below.
pub trait Connector: Send + Sync {
    /// The `tool` name this connector registers under.
    fn tool(&self) -> &str;

    /// Perform `op` against the backend and return its raw result. Errors
    /// here are the only way `execute`'s `{ok: false, error}` shape gets
    /// populated.
    fn dispatch(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        context: &GovernorContext,
    ) -> impl std::future::Future<Output = Result<Value, ConnectorError>> + Send;

    /// Build a read-only observation block from a successful dispatch
    /// result (e.g. confirming a created resource). Default: no observation.
    fn observe(&self, _op: &str, _result: &Value) -> Option<Value> {
        None
    }

    /// Dispatch `op` and assemble the `{ok, result, error, observation}`
    /// outcome spec.md §4.9 requires, calling [`Self::observe`] on every
    /// successful dispatch. Connectors implement [`Self::dispatch`] and
    /// [`Self::observe`]; they should not need to override this.
    fn execute(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        context: &GovernorContext,
    ) -> impl std::future::Future<Output = ConnectorOutcome> + Send {
        async move {
            match self.dispatch(op, params, credential, context).await {
                Ok(result) => {
                    let observation = self.observe(op, &result);
                    ConnectorOutcome::success(result, observation)
                }
                Err(err) => ConnectorOutcome::failure(err.to_string()),
            }
        }
    }
}

/// Object-safe connector trait for use behind `Arc<dyn DynConnector>`.
///
/// Implement [`Connector`] directly and rely on this blanket impl rather
/// than implementing `DynConnector` by hand.
#[async_trait]
pub trait DynConnector: Send + Sync {
    fn tool(&self) -> &str;
    async fn execute(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        context: &GovernorContext,
    ) -> ConnectorOutcome;
}

#[async_trait]
impl<T: Connector + Sync> DynConnector for T {
    fn tool(&self) -> &str {
        Connector::tool(self)
    }

    async fn execute(
        &self,
        op: &str,
        params: &Value,
        credential: Option<&CredentialHandle>,
        context: &GovernorContext,
    ) -> ConnectorOutcome {
        Connector::execute(self, op, params, credential, context).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    struct EchoConnector;

    impl Connector for EchoConnector {
        fn tool(&self) -> &str {
            "echo"
        }

        async fn dispatch(
            &self,
            op: &str,
            params: &Value,
            _credential: Option<&CredentialHandle>,
            _context: &GovernorContext,
        ) -> Result<Value, ConnectorError> {
            if op == "fail" {
                return Err(ConnectorError::ExecutionFailed("asked to fail".into()));
            }
            Ok(params.clone())
        }

        fn observe(&self, op: &str, _result: &Value) -> Option<Value> {
            (op == "create").then(|| serde_json::json!({"confirmed": true}))
        }
    }

    #[tokio::test]
    async fn execute_success_carries_observation() {
        let connector = EchoConnector;
        let outcome = connector
            .execute("create", &serde_json::json!({"x": 1}), None, &GovernorContext::new())
            .await;
        assert!(outcome.ok);
        assert_eq!(outcome.observation, Some(serde_json::json!({"confirmed": true})));
    }

    #[tokio::test]
    async fn execute_without_observation_hook_match() {
        let connector = EchoConnector;
        let outcome = connector
            .execute("read", &serde_json::json!({}), None, &GovernorContext::new())
            .await;
        assert!(outcome.ok);
        assert!(outcome.observation.is_none());
    }

    #[tokio::test]
    async fn execute_failure_populates_error() {
        let connector = EchoConnector;
        let outcome = connector
            .execute("fail", &serde_json::Value::Null, None, &GovernorContext::new())
            .await;
        assert!(!outcome.ok);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn blanket_dyn_connector_impl() {
        let connector: Arc<dyn DynConnector> = Arc::new(EchoConnector);
        assert_eq!(connector.tool(), "echo");
        let outcome = connector
            .execute("read", &serde_json::json!({"a": 1}), None, &GovernorContext::new())
            .await;
        assert!(outcome.ok);
    }
}
