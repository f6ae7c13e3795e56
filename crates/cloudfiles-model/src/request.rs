//! Typed upload requests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use cloudfiles_core::{ManifestKind, ObjectName};
use typed_builder::TypedBuilder;

use crate::error::InvalidArgument;
use crate::options::UploadOptions;
use crate::progress::ProgressCallback;

/// Where the bytes of an upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// Content held in memory.
    InlineBody(Bytes),
    /// Content read from a local file at plan time.
    FilePath(PathBuf),
}

impl EntityRef {
    /// Inline content.
    pub fn inline(body: impl Into<Bytes>) -> Self {
        Self::InlineBody(body.into())
    }

    /// File-backed content.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::FilePath(path.into())
    }

    /// The file path, if this is a file-backed source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FilePath(path) => Some(path),
            Self::InlineBody(_) => None,
        }
    }
}

/// A validated upload request.
///
/// `None` for `part_size`, `concurrency` or `manifest_kind` means "use the
/// client configuration default".
///
/// # Examples
///
/// ```
/// use cloudfiles_core::ObjectName;
/// use cloudfiles_model::{EntityRef, UploadRequest};
///
/// let request = UploadRequest::builder()
///     .name(ObjectName::new("backup.tar").unwrap())
///     .source(EntityRef::file("/var/backups/backup.tar"))
///     .part_size(20 * 1024 * 1024)
///     .concurrency(3)
///     .build();
/// assert_eq!(request.concurrency, Some(3));
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct UploadRequest {
    /// Name of the logical object.
    pub name: ObjectName,
    /// Content source.
    pub source: EntityRef,
    /// Segment size in bytes.
    #[builder(default, setter(strip_option))]
    pub part_size: Option<u64>,
    /// Maximum segments in flight.
    #[builder(default, setter(strip_option))]
    pub concurrency: Option<usize>,
    /// User metadata.
    #[builder(default)]
    pub metadata: BTreeMap<String, String>,
    /// Manifest flavour for segmented uploads.
    #[builder(default, setter(strip_option))]
    pub manifest_kind: Option<ManifestKind>,
    /// `Content-Type` of the assembled object.
    #[builder(default, setter(strip_option, into))]
    pub content_type: Option<String>,
    /// Per-segment progress callback.
    #[builder(default, setter(strip_option))]
    pub progress: Option<ProgressCallback>,
}

impl UploadRequest {
    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl TryFrom<UploadOptions> for UploadRequest {
    type Error = InvalidArgument;

    fn try_from(options: UploadOptions) -> Result<Self, Self::Error> {
        let name = match options.name {
            Some(name) if !name.is_empty() => ObjectName::new(name)?,
            _ => return Err(InvalidArgument::new("an object name is required")),
        };

        let source = match (options.path, options.body) {
            (Some(_), Some(_)) => {
                return Err(InvalidArgument::new(
                    "path and body are mutually exclusive",
                ));
            }
            (Some(path), None) => EntityRef::FilePath(path),
            (None, Some(body)) => EntityRef::InlineBody(Bytes::from(body)),
            (None, None) => {
                return Err(InvalidArgument::new(
                    "either a readable path or a body is required",
                ));
            }
        };

        if options.part_size == Some(0) {
            return Err(InvalidArgument::new("partSize must be a positive integer"));
        }
        if options.concurrency == Some(0) {
            return Err(InvalidArgument::new(
                "concurrency must be a positive integer",
            ));
        }

        Ok(Self {
            name,
            source,
            part_size: options.part_size,
            concurrency: options.concurrency,
            metadata: options.metadata.unwrap_or_default(),
            manifest_kind: options.manifest,
            content_type: options.content_type,
            progress: None,
        })
    }
}
