use std::time::Duration;

use thiserror::Error;

/// Errors a Connector can raise while dispatching an action.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("connector not found for tool: {0}")]
    NotFound(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A resolved path, recipient, or other resource escaped the connector's
    /// declared boundary (e.g. a filesystem sandbox root). Spec.md §4.9
    /// requires the FilesystemConnector to refuse in exactly this shape.
    #[error("value error: {0}")]
    ValueError(String),

    /// No credential was supplied where the connector requires one.
    #[error("missing credential for tool: {0}")]
    MissingCredential(String),
}

impl ConnectorError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ConnectorError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ConnectorError::Connection("reset".into()).is_retryable());
        assert!(!ConnectorError::ValueError("escape".into()).is_retryable());
    }
}
