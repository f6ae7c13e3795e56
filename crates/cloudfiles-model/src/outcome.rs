//! Results of a finished upload.

use cloudfiles_core::ManifestKind;
use http::StatusCode;

/// Response to one segment upload (or to the whole object for single-shot uploads).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResponse {
    /// Index of the part in the plan.
    pub index: usize,
    /// Object name the bytes were stored under.
    pub name: String,
    /// Bytes sent.
    pub size: u64,
    /// ETag returned by the store (unquoted hex MD5), if any.
    pub etag: Option<String>,
    /// HTTP status of the upload request.
    pub status: StatusCode,
}

/// Response to the manifest registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResponse {
    /// Name of the assembled object.
    pub name: String,
    /// Manifest flavour that was written.
    pub kind: ManifestKind,
    /// Segments the manifest refers to.
    pub part_count: usize,
    /// HTTP status of the manifest request.
    pub status: StatusCode,
    /// ETag returned by the store, if any.
    pub etag: Option<String>,
}

/// Everything the store said about a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Part responses ordered by part index.
    pub responses: Vec<PartResponse>,
    /// Manifest response; `None` for single-shot uploads.
    pub manifest: Option<ManifestResponse>,
}

impl UploadOutcome {
    /// Total bytes acknowledged by the store.
    #[must_use]
    pub fn bytes_uploaded(&self) -> u64 {
        self.responses.iter().map(|r| r.size).sum()
    }

    /// Whether the object was assembled from segments.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.manifest.is_some()
    }
}
