//! In-memory transport for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode};

use crate::checksums::compute_etag;
use crate::transport::{Transport, TransportError};

type Responder =
    Box<dyn Fn(&http::Request<Bytes>) -> Result<Response<Bytes>, TransportError> + Send + Sync>;
type Latency = Box<dyn Fn(&http::Request<Bytes>) -> Duration + Send + Sync>;

/// A request as seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Records every request and answers through a configurable responder.
///
/// By default every request gets `201 Created` with the MD5 of the body as
/// `ETag`, like a healthy Swift proxy.
pub(crate) struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responder: Responder,
    latency: Option<Latency>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

pub(crate) fn created(request: &http::Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header(http::header::ETAG, compute_etag(request.body()))
        .body(Bytes::new())
        .unwrap())
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::with_responder(created)
    }

    pub(crate) fn with_responder(
        responder: impl Fn(&http::Request<Bytes>) -> Result<Response<Bytes>, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn latency(
        mut self,
        latency: impl Fn(&http::Request<Bytes>) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Some(Box::new(latency));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().clone(),
            uri: request.uri().to_string(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        });

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency(&request)).await;
        }

        let response = (self.responder)(&request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
