//! The HTTP seam between the upload core and the outside world.
//!
//! The core never opens connections itself. Every request goes through a
//! caller-supplied [`Transport`], which makes the whole upload path
//! drivable by an in-memory test double. Authentication, retries, and
//! timeouts are the transport's business.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

/// Performs a single HTTP request.
///
/// Implementations return the response for any status code; only failures
/// to obtain a response at all (DNS, connect, TLS, timeout) are errors.
///
/// # Object Safety
///
/// The trait uses `async-trait` boxing so containers can hold an
/// `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request` and return the full response.
    async fn send(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>, TransportError>;
}

/// Opaque transport failure, propagated to the caller unchanged.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    /// Create an error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message, without the underlying cause.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_format_transport_error() {
        let err = TransportError::new("connection reset");
        assert_eq!(err.to_string(), "transport error: connection reset");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_should_keep_underlying_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline exceeded");
        let err = TransportError::with_source("request timed out", io);
        assert_eq!(err.message(), "request timed out");
        assert!(
            err.source()
                .is_some_and(|s| s.to_string().contains("deadline"))
        );
    }
}
