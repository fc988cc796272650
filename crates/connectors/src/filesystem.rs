use std::path::{Path, PathBuf};

use edon_core::{CredentialHandle, GovernorContext};
use serde_json::Value;
use tokio::fs;

use crate::connector::Connector;
use crate::error::ConnectorError;

/// Sandboxed `read_file`/`write_file`/`delete_file` (spec.md §4.9
/// FilesystemConnector). Any resolved path escaping `sandbox_root` is
/// refused with [`ConnectorError::ValueError`] before any I/O happens.
pub struct FilesystemConnector {
    sandbox_root: PathBuf,
}

impl FilesystemConnector {
    #[must_use]
    pub fn new(sandbox_root: impl Into<PathBuf>) -> Self {
        Self {
            sandbox_root: sandbox_root.into(),
        }
    }

    /// Resolve `requested` against the sandbox root and verify the result
    /// stays within it. Works on path components rather than
    /// `canonicalize()` so the check also rejects paths to files that don't
    /// exist yet (needed for `write_file` creating a new file).
    fn resolve(&self, requested: &str) -> Result<PathBuf, ConnectorError> {
        let mut resolved = self.sandbox_root.clone();
        for component in Path::new(requested).components() {
            use std::path::Component;
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ConnectorError::ValueError(format!(
                        "path escapes sandbox root: {requested}"
                    )));
                }
            }
        }
        if !resolved.starts_with(&self.sandbox_root) {
            return Err(ConnectorError::ValueError(format!(
                "path escapes sandbox root: {requested}"
            )));
        }
        Ok(resolved)
    }

    fn path_param(params: &Value) -> Result<&str, ConnectorError> {
        params
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectorError::ValueError("missing required field: path".into()))
    }
}

impl Connector for FilesystemConnector {
    fn tool(&self) -> &str {
        "filesystem"
    }

    async fn dispatch(
        &self,
        op: &str,
        params: &Value,
        _credential: Option<&CredentialHandle>,
        _context: &GovernorContext,
    ) -> Result<Value, ConnectorError> {
        let requested = Self::path_param(params)?;
        let path = self.resolve(requested)?;

        match op {
            "read_file" => {
                let contents = fs::read_to_string(&path)
                    .await
                    .map_err(|e| ConnectorError::ExecutionFailed(e.to_string()))?;
                Ok(serde_json::json!({"path": requested, "contents": contents}))
            }
            "write_file" => {
                let contents = params
                    .get("contents")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ConnectorError::ValueError("missing required field: contents".into()))?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .await
                        .map_err(|e| ConnectorError::ExecutionFailed(e.to_string()))?;
                }
                fs::write(&path, contents)
                    .await
                    .map_err(|e| ConnectorError::ExecutionFailed(e.to_string()))?;
                Ok(serde_json::json!({"path": requested, "bytes_written": contents.len()}))
            }
            "delete_file" => {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| ConnectorError::ExecutionFailed(e.to_string()))?;
                Ok(serde_json::json!({"path": requested, "deleted": true}))
            }
            other => Err(ConnectorError::ExecutionFailed(format!("unsupported op: {other}"))),
        }
    }

    fn observe(&self, op: &str, result: &Value) -> Option<Value> {
        (op != "read_file").then(|| serde_json::json!({"confirmed": result.get("path").cloned()}))
    }
}
