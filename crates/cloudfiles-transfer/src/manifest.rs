//! Manifest registration.
//!
//! Once every segment is stored, a single request turns them into one
//! logical object. Two manifest flavours are supported:
//!
//! - **Dynamic**: a zero-byte object whose `X-Object-Manifest` header names
//!   the segment prefix. The store concatenates whatever objects match the
//!   prefix, in lexicographic order, at read time.
//! - **Static**: a JSON list of segments with their ETags and sizes, `PUT`
//!   with `?multipart-manifest=put`. The store checks every entry when the
//!   manifest is written.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};
use http::{HeaderMap, HeaderName, Method, Request};
use serde::Serialize;
use tracing::{info, warn};

use cloudfiles_core::{ContainerName, ManifestKind, ObjectName};
use cloudfiles_model::{ManifestResponse, Part, PartResponse};

use crate::checksums::normalize_etag;
use crate::error::{RequestError, TransferError, TransferResult};
use crate::transport::Transport;
use crate::utils::{encode_path, object_url};

/// Header naming the segment prefix of a dynamic manifest.
pub const OBJECT_MANIFEST_HEADER: HeaderName = HeaderName::from_static("x-object-manifest");

/// Query string marking a static manifest upload.
const STATIC_MANIFEST_QUERY: &str = "multipart-manifest=put";

/// One entry of a static manifest.
#[derive(Debug, Serialize)]
struct StaticSegment<'a> {
    path: String,
    etag: Option<&'a str>,
    size_bytes: u64,
}

/// Writes the manifest that assembles uploaded segments.
#[derive(Debug, Clone)]
pub struct ManifestAssembler {
    transport: Arc<dyn Transport>,
    base_url: String,
    container: ContainerName,
}

impl ManifestAssembler {
    /// Create an assembler for objects in `container` under `base_url`.
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        container: ContainerName,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            container,
        }
    }

    /// Register `parts`, ordered by index, as the object `name`.
    ///
    /// `headers` (metadata and content type) are applied to the manifest
    /// object, which is the object readers see.
    ///
    /// # Notes
    ///
    /// A dynamic manifest serves every object under `<name>/part-`, not just
    /// `parts`. Overwriting `name` with fewer segments than an earlier upload
    /// leaves the old trailing segments in the served content. Use
    /// [`ManifestKind::Static`] when overwriting, or delete the old segments
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::ManifestError`] if the request fails or the
    /// store rejects it. The segments stay in the container either way.
    pub async fn assemble(
        &self,
        name: &ObjectName,
        kind: ManifestKind,
        parts: &[PartResponse],
        headers: &HeaderMap,
    ) -> TransferResult<ManifestResponse> {
        let request = match kind {
            ManifestKind::Dynamic => self.dynamic_request(name, headers),
            ManifestKind::Static => self.static_request(name, parts, headers),
        };
        let result = self.send(request).await;

        match result {
            Ok((status, etag)) => {
                info!(
                    container = %self.container,
                    object = %name,
                    manifest = %kind,
                    part_count = parts.len(),
                    %status,
                    "assembled large object"
                );
                Ok(ManifestResponse {
                    name: name.to_string(),
                    kind,
                    part_count: parts.len(),
                    status,
                    etag,
                })
            }
            Err(cause) => {
                warn!(
                    container = %self.container,
                    object = %name,
                    part_count = parts.len(),
                    error = %cause,
                    "manifest write failed, segments left unassembled"
                );
                Err(TransferError::ManifestError {
                    name: name.to_string(),
                    part_count: parts.len(),
                    cause,
                })
            }
        }
    }

    fn dynamic_request(
        &self,
        name: &ObjectName,
        headers: &HeaderMap,
    ) -> Result<Request<Bytes>, RequestError> {
        let prefix = format!(
            "{}/{}",
            encode_path(self.container.as_str()),
            encode_path(&Part::segment_prefix(name))
        );
        let mut request = Request::builder()
            .method(Method::PUT)
            .uri(object_url(&self.base_url, &self.container, name))
            .header(CONTENT_LENGTH, 0)
            .header(OBJECT_MANIFEST_HEADER, prefix)
            .body(Bytes::new())?;
        extend_headers(&mut request, headers);
        Ok(request)
    }

    fn static_request(
        &self,
        name: &ObjectName,
        parts: &[PartResponse],
        headers: &HeaderMap,
    ) -> Result<Request<Bytes>, RequestError> {
        let segments: Vec<StaticSegment<'_>> = parts
            .iter()
            .map(|part| StaticSegment {
                path: format!("/{}/{}", self.container, part.name),
                etag: part.etag.as_deref(),
                size_bytes: part.size,
            })
            .collect();
        let body = Bytes::from(serde_json::to_vec(&segments)?);

        let mut request = Request::builder()
            .method(Method::PUT)
            .uri(format!(
                "{}?{STATIC_MANIFEST_QUERY}",
                object_url(&self.base_url, &self.container, name)
            ))
            .header(CONTENT_LENGTH, body.len())
            .body(body)?;
        extend_headers(&mut request, headers);
        if !request.headers().contains_key(CONTENT_TYPE) {
            request.headers_mut().insert(
                CONTENT_TYPE,
                http::HeaderValue::from_static("application/octet-stream"),
            );
        }
        Ok(request)
    }

    async fn send(
        &self,
        request: Result<Request<Bytes>, RequestError>,
    ) -> Result<(http::StatusCode, Option<String>), RequestError> {
        let response = self.transport.send(request?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::UnexpectedStatus { status });
        }
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(normalize_etag);
        Ok((status, etag))
    }
}

fn extend_headers(request: &mut Request<Bytes>, headers: &HeaderMap) {
    request
        .headers_mut()
        .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
}

#[cfg(test)]
mod tests {
    use http::{Response, StatusCode};

    use super::*;
    use crate::testing::MockTransport;
    use crate::transport::TransportError;

    fn responses() -> Vec<PartResponse> {
        [20u64, 20, 5]
            .into_iter()
            .enumerate()
            .map(|(index, size)| PartResponse {
                index,
                name: format!("new_object/part-{index:08}"),
                size,
                etag: Some(format!("etag{index}")),
                status: StatusCode::CREATED,
            })
            .collect()
    }

    fn assembler(transport: &Arc<MockTransport>) -> ManifestAssembler {
        ManifestAssembler::new(
            Arc::clone(transport) as Arc<dyn Transport>,
            "http://store/v1/AUTH_test",
            ContainerName::new("test").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_should_write_dynamic_manifest() {
        let transport = Arc::new(MockTransport::new());
        let mut headers = HeaderMap::new();
        headers.insert("x-object-meta-author", "Jamie".parse().unwrap());

        let response = assembler(&transport)
            .assemble(
                &ObjectName::new("new_object").unwrap(),
                ManifestKind::Dynamic,
                &responses(),
                &headers,
            )
            .await
            .unwrap();
        assert_eq!(response.part_count, 3);
        assert_eq!(response.kind, ManifestKind::Dynamic);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, "http://store/v1/AUTH_test/test/new_object");
        assert_eq!(requests[0].headers[OBJECT_MANIFEST_HEADER], "test/new_object/part-");
        assert_eq!(requests[0].headers["x-object-meta-author"], "Jamie");
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_should_write_static_manifest_in_part_order() {
        let transport = Arc::new(MockTransport::new());
        assembler(&transport)
            .assemble(
                &ObjectName::new("new_object").unwrap(),
                ManifestKind::Static,
                &responses(),
                &HeaderMap::new(),
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].uri,
            "http://store/v1/AUTH_test/test/new_object?multipart-manifest=put"
        );
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!([
                {"path": "/test/new_object/part-00000000", "etag": "etag0", "size_bytes": 20},
                {"path": "/test/new_object/part-00000001", "etag": "etag1", "size_bytes": 20},
                {"path": "/test/new_object/part-00000002", "etag": "etag2", "size_bytes": 5},
            ])
        );
    }

    #[tokio::test]
    async fn test_should_report_manifest_failure_with_part_count() {
        let transport = Arc::new(MockTransport::with_responder(|_| {
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Bytes::new())
                .unwrap())
        }));
        let err = assembler(&transport)
            .assemble(
                &ObjectName::new("new_object").unwrap(),
                ManifestKind::Dynamic,
                &responses(),
                &HeaderMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::ManifestError { part_count: 3, ref name, .. } if name == "new_object"
        ));
    }

    #[tokio::test]
    async fn test_should_carry_transport_error_in_manifest_error() {
        let transport = Arc::new(MockTransport::with_responder(|_| {
            Err(TransportError::new("broken pipe"))
        }));
        let err = assembler(&transport)
            .assemble(
                &ObjectName::new("new_object").unwrap(),
                ManifestKind::Static,
                &responses(),
                &HeaderMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.transport_error().map(TransportError::message),
            Some("broken pipe")
        );
    }
}
