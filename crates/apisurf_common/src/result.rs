//! Common result and error types for the apisurf toolchain.

/// The standard result type for fallible internal operations.
pub type SurfResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in apisurf, not a problem with the
/// headers or the cache file being processed.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
