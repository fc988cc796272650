use std::collections::HashMap;
use std::sync::Arc;

use crate::connector::DynConnector;

/// Maps `tool` names to their connector implementation.
///
/// Built once at startup and shared behind an `Arc`; not safe for concurrent
/// mutation.
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn DynConnector>>,
}

impl ConnectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: HashMap::new(),
        }
    }

    /// Register a connector under its own [`DynConnector::tool`] name,
    /// replacing any existing registration for that tool.
    pub fn register(&mut self, connector: Arc<dyn DynConnector>) {
        self.connectors.insert(connector.tool().to_owned(), connector);
    }

    #[must_use]
    pub fn get(&self, tool: &str) -> Option<Arc<dyn DynConnector>> {
        self.connectors.get(tool).cloned()
    }

    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
