/// Reject-only validation failure. Every variant carries enough to build the
/// `detail` string spec.md §4.6 requires ("containing the JSONPath of the
/// first offending field").
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("request body exceeds {max_bytes} bytes")]
    BodyTooLarge { max_bytes: usize },

    #[error("action.params exceeds {max_bytes} bytes")]
    ParamsTooLarge { max_bytes: usize },

    #[error("nesting depth exceeds limit at path: {path}")]
    TooDeep { path: String },

    #[error("string field exceeds size limit at path: {path}")]
    StringTooLarge { path: String },

    #[error("array length exceeds limit at path: {path}")]
    ArrayTooLarge { path: String },

    #[error("Script tags not allowed at path: {path}")]
    ScriptInjection { path: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("malformed request body: {0}")]
    Malformed(String),
}
