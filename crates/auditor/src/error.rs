/// Errors the Auditor can raise.
///
/// Per spec.md §4.4, a persistence failure must never mask the underlying
/// [`edon_core::Decision`] — callers are expected to log this error and
/// continue returning the decision, not propagate it to the HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit persistence failed: {0}")]
    Storage(#[from] edon_store::StoreError),

    #[error("action snapshot is malformed: {0}")]
    Serialization(String),
}
