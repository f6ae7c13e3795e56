//! Error types for the cloudfiles core.

/// Core error type for shared cloudfiles infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid container name.
    #[error("invalid container name {name:?}: {reason}")]
    InvalidContainerName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Invalid object name.
    #[error("invalid object name {name:?}: {reason}")]
    InvalidObjectName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
