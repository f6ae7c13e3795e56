//! Validation error raised before any request leaves the client.

/// A malformed or incomplete upload request.
///
/// Always detected before any network activity; the caller can fix the
/// input and try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument: {message}")]
pub struct InvalidArgument {
    /// Description of what was wrong.
    pub message: String,
}

impl InvalidArgument {
    /// Create a new error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<cloudfiles_core::CoreError> for InvalidArgument {
    fn from(err: cloudfiles_core::CoreError) -> Self {
        Self::new(err.to_string())
    }
}
