use thiserror::Error;

/// Shared error type for domain-level invariant violations raised while
/// constructing or validating core types, independent of any particular
/// crate's I/O (store, HTTP, vault) errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed decision: {0}")]
    MalformedDecision(String),

    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("{0}")]
    Other(String),
}
