use serde_json::Value;

/// Result of dispatching one action to a Connector (spec.md §4.9):
/// `{ok, result?, error?, observation?}`.
#[derive(Debug, Clone)]
pub struct ConnectorOutcome {
    pub ok: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub observation: Option<Value>,
}

impl ConnectorOutcome {
    #[must_use]
    pub fn success(result: Value, observation: Option<Value>) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            observation,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            observation: None,
        }
    }
}
