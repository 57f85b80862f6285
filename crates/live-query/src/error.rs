use thiserror::Error;

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

/// Error reported by a query source invocation (wraps arbitrary error
/// strings from the underlying database client).
#[derive(Debug, Clone, Error)]
#[error("Query failed: {message}")]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LiveQueryError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LiveQueryError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Live query is disposed")]
    Disposed,
}

/// Convenience alias — the default error type is `LiveQueryError`.
pub type Result<T, E = LiveQueryError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
