//! Upload planning.
//!
//! Planning validates a request, resolves its source to a known size, and
//! splits it into segments. Every check that can fail on caller input runs
//! here, so a request that plans successfully never fails on input later
//! and a request that does not plan never touches the network.

use std::ops::Range;
use std::path::Path;

use http::HeaderMap;
use tracing::debug;

use cloudfiles_core::{ClientConfig, ManifestKind, ObjectName};
use cloudfiles_model::{EntityRef, InvalidArgument, Part, UploadOptions, UploadPlan, UploadRequest};

use crate::error::TransferResult;
use crate::source::PlannedSource;
use crate::validation::{
    MAX_STATIC_SEGMENTS, object_headers, validate_concurrency, validate_part_size,
};

/// A validated plan together with everything needed to execute it.
#[derive(Debug, Clone)]
pub struct PlannedUpload {
    /// Segment layout.
    pub plan: UploadPlan,
    /// Resolved content source.
    pub source: PlannedSource,
    /// Manifest flavour used when the plan is segmented.
    pub manifest_kind: ManifestKind,
    /// Headers applied to the logical object (metadata and content type).
    pub headers: HeaderMap,
}

/// Plan an upload.
///
/// Request values fall back to the `config` defaults. File sources are
/// opened here and stay open for the lifetime of the returned plan.
///
/// # Errors
///
/// Returns [`TransferError::InvalidArgument`](crate::TransferError::InvalidArgument)
/// when the request cannot be uploaded as given: the file is missing or not
/// a regular file, a size or concurrency bound is out of range, the metadata
/// breaks a store limit, or a static manifest would exceed the segment limit.
pub async fn plan(request: &UploadRequest, config: &ClientConfig) -> TransferResult<PlannedUpload> {
    let part_size = request.part_size.unwrap_or(config.default_part_size);
    validate_part_size(part_size)?;
    let concurrency = request.concurrency.unwrap_or(config.default_concurrency);
    validate_concurrency(concurrency)?;
    let manifest_kind = request
        .manifest_kind
        .unwrap_or(config.default_manifest_kind);
    let headers = object_headers(&request.metadata, request.content_type.as_deref())?;

    let source = resolve_source(&request.source).await?;
    let total_size = source.size();
    let is_multipart = total_size > part_size;

    let parts: Vec<Part> = if is_multipart {
        segment_ranges(total_size, part_size)
            .into_iter()
            .enumerate()
            .map(|(index, range)| Part {
                index,
                offset: range.start,
                length: range.end - range.start,
                name: Part::segment_name(&request.name, index),
            })
            .collect()
    } else {
        vec![Part {
            index: 0,
            offset: 0,
            length: total_size,
            name: request.name.to_string(),
        }]
    };

    if is_multipart {
        // segment names must themselves be valid object names
        if let Some(last) = parts.last() {
            ObjectName::new(last.name.as_str())?;
        }
    }

    if is_multipart && manifest_kind == ManifestKind::Static && parts.len() > MAX_STATIC_SEGMENTS {
        return Err(InvalidArgument::new(format!(
            "a static manifest may list at most {MAX_STATIC_SEGMENTS} segments, \
             {total_size} bytes at partSize {part_size} needs {}",
            parts.len()
        ))
        .into());
    }

    debug!(
        object = %request.name,
        total_size,
        part_size,
        part_count = parts.len(),
        concurrency,
        is_multipart,
        manifest = %manifest_kind,
        "planned upload"
    );

    Ok(PlannedUpload {
        plan: UploadPlan {
            object_name: request.name.clone(),
            total_size,
            part_size,
            concurrency,
            is_multipart,
            parts,
        },
        source,
        manifest_kind,
        headers,
    })
}

/// Plan an upload described by an option bag.
///
/// # Errors
///
/// Returns [`TransferError::InvalidArgument`](crate::TransferError::InvalidArgument)
/// if the options do not form a valid request or fail [`plan`].
pub async fn plan_options(options: UploadOptions, config: &ClientConfig) -> TransferResult<PlannedUpload> {
    let request = UploadRequest::try_from(options)?;
    plan(&request, config).await
}

/// Split `[0, total)` into contiguous ranges of at most `part_size` bytes.
///
/// A source no larger than `part_size` (including an empty one) yields a
/// single range. `part_size` must be non-zero.
///
/// # Examples
///
/// ```
/// use cloudfiles_transfer::planner::segment_ranges;
///
/// assert_eq!(segment_ranges(45, 20), vec![0..20, 20..40, 40..45]);
/// assert_eq!(segment_ranges(3, 20), vec![0..3]);
/// ```
#[must_use]
pub fn segment_ranges(total: u64, part_size: u64) -> Vec<Range<u64>> {
    if total <= part_size || part_size == 0 {
        return vec![0..total];
    }
    let count = total.div_ceil(part_size);
    (0..count)
        .map(|i| {
            let start = i * part_size;
            start..(start + part_size).min(total)
        })
        .collect()
}

async fn resolve_source(source: &EntityRef) -> Result<PlannedSource, InvalidArgument> {
    match source {
        EntityRef::InlineBody(body) => Ok(PlannedSource::Inline(body.clone())),
        EntityRef::FilePath(path) => open_file(path).await,
    }
}

async fn open_file(path: &Path) -> Result<PlannedSource, InvalidArgument> {
    let unreadable = |e: std::io::Error| {
        InvalidArgument::new(format!("{} is not a readable file: {e}", path.display()))
    };

    let file = tokio::fs::File::open(path).await.map_err(unreadable)?;
    let metadata = file.metadata().await.map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(InvalidArgument::new(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    Ok(PlannedSource::file(path, file.into_std().await, metadata.len()))
}
