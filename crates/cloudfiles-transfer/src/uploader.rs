//! Single-request object and segment uploads.

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, ETAG};
use http::{HeaderMap, Method, Request};
use tracing::debug;

use cloudfiles_core::ContainerName;
use cloudfiles_model::{Part, PartResponse};

use crate::checksums::{compute_md5, etag_matches, normalize_etag};
use crate::error::RequestError;
use crate::transport::Transport;
use crate::utils::segment_url;

/// Uploads one part as one request. Implementations must not retry.
#[async_trait]
pub trait PartUploader: Send + Sync + fmt::Debug {
    /// Store `body` under `part.name`, adding `headers` to the request.
    async fn upload_part(
        &self,
        part: &Part,
        body: Bytes,
        headers: &HeaderMap,
    ) -> Result<PartResponse, RequestError>;
}

/// [`PartUploader`] that issues an object `PUT` through a [`Transport`].
///
/// The request carries the body's MD5 as `ETag`, so the store rejects
/// corrupted bodies itself. When checksum verification is on, the `ETag`
/// the store returns is compared as well.
#[derive(Debug, Clone)]
pub struct ObjectUploader {
    transport: Arc<dyn Transport>,
    base_url: String,
    container: ContainerName,
    verify_checksums: bool,
}

impl ObjectUploader {
    /// Create an uploader for objects in `container` under `base_url`.
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        container: ContainerName,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            container,
            verify_checksums: true,
        }
    }

    /// Enable or disable comparison of returned ETags.
    #[must_use]
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }
}

#[async_trait]
impl PartUploader for ObjectUploader {
    async fn upload_part(
        &self,
        part: &Part,
        body: Bytes,
        headers: &HeaderMap,
    ) -> Result<PartResponse, RequestError> {
        let expected = digest(body.clone()).await?;
        let size = body.len() as u64;

        let mut request = Request::builder()
            .method(Method::PUT)
            .uri(segment_url(&self.base_url, &self.container, &part.name))
            .header(CONTENT_LENGTH, size)
            .header(ETAG, expected.as_str())
            .body(body)?;
        request
            .headers_mut()
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        let response = self.transport.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::UnexpectedStatus { status });
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(normalize_etag);
        if self.verify_checksums {
            if let Some(actual) = &etag {
                if !etag_matches(&expected, actual) {
                    return Err(RequestError::ChecksumMismatch {
                        expected,
                        actual: actual.clone(),
                    });
                }
            }
        }

        debug!(
            container = %self.container,
            part = part.index,
            name = %part.name,
            size,
            %status,
            "uploaded part"
        );

        Ok(PartResponse {
            index: part.index,
            name: part.name.clone(),
            size,
            etag,
            status,
        })
    }
}

/// MD5 of `body`, computed on the blocking pool.
async fn digest(body: Bytes) -> Result<String, RequestError> {
    let md5 = tokio::task::spawn_blocking(move || compute_md5(&body))
        .await
        .map_err(io::Error::other)?;
    Ok(md5)
}
