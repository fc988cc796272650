use thiserror::Error;

/// Errors the store contract can fail with (spec.md §4.1 "Fails with").
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying file/connection could not be opened. Fatal at
    /// startup — the server MUST abort rather than serve requests.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A uniqueness or state constraint was violated (e.g. a token already
    /// bound to a different agent).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_owned()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_owned())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}
