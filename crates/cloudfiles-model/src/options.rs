//! The caller-facing option bag for uploads.
//!
//! [`UploadOptions`] mirrors the loosely typed options an application
//! collects from configuration or user input. Unknown keys are rejected
//! instead of being silently dropped, and nothing is validated beyond
//! shape until it is converted into an [`UploadRequest`](crate::UploadRequest).

use std::collections::BTreeMap;
use std::path::PathBuf;

use cloudfiles_core::ManifestKind;
use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

/// Loosely typed upload options.
///
/// # Examples
///
/// ```
/// use cloudfiles_model::UploadOptions;
///
/// let options = UploadOptions::from_json(serde_json::json!({
///     "name": "new_object",
///     "path": "/tmp/data.bin",
///     "partSize": 20971520,
///     "concurrency": 3,
/// }))
/// .unwrap();
/// assert_eq!(options.concurrency, Some(3));
///
/// let err = UploadOptions::from_json(serde_json::json!({"name": "x", "baz": 1}));
/// assert!(err.is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UploadOptions {
    /// Object name. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Local file to upload. Mutually exclusive with `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Inline content. Mutually exclusive with `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// User metadata stored as `X-Object-Meta-*` headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Segment size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_size: Option<u64>,
    /// Maximum segments in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Manifest flavour for segmented uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestKind>,
    /// `Content-Type` of the assembled object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl UploadOptions {
    /// Parse options from a JSON value, rejecting unknown keys.
    pub fn from_json(value: serde_json::Value) -> Result<Self, InvalidArgument> {
        serde_json::from_value(value).map_err(|e| InvalidArgument::new(e.to_string()))
    }
}
