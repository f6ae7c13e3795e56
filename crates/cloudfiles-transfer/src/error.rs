//! Upload error types.
//!
//! [`TransferError`] is what callers of the upload entry points see. Each
//! variant tells the caller which step failed so that only that step needs
//! to be repeated:
//!
//! - [`TransferError::InvalidArgument`]: nothing was sent.
//! - [`TransferError::Transport`]: a single-request upload could not reach
//!   the store; the transport's error is passed through unchanged.
//! - [`TransferError::PartUploadFailed`]: one segment failed; no new
//!   segments were started after it, segments already in flight finished.
//! - [`TransferError::ManifestError`]: every segment is stored but the
//!   manifest was not written, so the segments are not yet one object.
//!   They are not cleaned up automatically.
//!
//! Nothing in this crate retries.

use http::StatusCode;

use cloudfiles_model::InvalidArgument;

use crate::transport::TransportError;

/// Why a single request (segment, single-shot object, or manifest) failed.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The transport could not obtain a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The store answered with a non-success status.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// Status returned by the store.
        status: StatusCode,
    },

    /// The ETag returned for a segment does not match the bytes sent.
    #[error("checksum mismatch: expected {expected}, store returned {actual}")]
    ChecksumMismatch {
        /// Hex MD5 of the bytes sent.
        expected: String,
        /// ETag returned by the store.
        actual: String,
    },

    /// The segment bytes could not be read from the source.
    #[error("failed to read source: {0}")]
    Read(#[from] std::io::Error),

    /// The static manifest body could not be encoded.
    #[error("failed to encode manifest: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request could not be built (for example, an unparsable storage URL).
    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),
}

/// Upload error surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The request was malformed or incomplete; nothing was sent.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// The transport failed while sending a single-request upload.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A segment (or the single-shot object) could not be uploaded.
    #[error("failed to upload part {index} ({name}): {cause}")]
    PartUploadFailed {
        /// Index of the failed part.
        index: usize,
        /// Object name the part was addressed to.
        name: String,
        /// What went wrong.
        #[source]
        cause: RequestError,
    },

    /// All segments were stored but the manifest could not be written.
    #[error(
        "{part_count} segments of {name} were uploaded but the manifest could not be written: {cause}"
    )]
    ManifestError {
        /// Name of the object that was being assembled.
        name: String,
        /// Segments left unassembled.
        part_count: usize,
        /// What went wrong.
        #[source]
        cause: RequestError,
    },
}

impl TransferError {
    /// Shorthand for an [`InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(InvalidArgument::new(message))
    }

    /// Index of the failed part, for [`TransferError::PartUploadFailed`].
    #[must_use]
    pub fn part_index(&self) -> Option<usize> {
        match self {
            Self::PartUploadFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The underlying transport error, if the failure came from the transport.
    #[must_use]
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e)
            | Self::PartUploadFailed {
                cause: RequestError::Transport(e),
                ..
            }
            | Self::ManifestError {
                cause: RequestError::Transport(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}

impl From<cloudfiles_core::CoreError> for TransferError {
    fn from(err: cloudfiles_core::CoreError) -> Self {
        Self::InvalidArgument(err.into())
    }
}

/// Convenience result type for upload operations.
pub type TransferResult<T> = Result<T, TransferError>;
