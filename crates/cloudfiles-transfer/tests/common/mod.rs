//! Shared fixtures for upload integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cloudfiles_core::{ClientConfig, ContainerName};
use cloudfiles_transfer::checksums::compute_etag;
use cloudfiles_transfer::{Container, Transport, TransportError};
use http::{HeaderMap, Method, Response, StatusCode};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

pub const STORAGE_URL: &str = "http://storage.test/v1/AUTH_test";
pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn is_manifest(&self) -> bool {
        self.headers.contains_key("x-object-manifest") || self.uri.ends_with("?multipart-manifest=put")
    }

    pub fn segment_index(&self) -> Option<usize> {
        self.uri
            .rsplit_once("/part-")
            .and_then(|(_, index)| index.parse().ok())
    }
}

type Responder = dyn Fn(&Recorded) -> Result<Response<Bytes>, TransportError> + Send + Sync;
type Latency = dyn Fn(&Recorded) -> Duration + Send + Sync;

/// A transport that behaves like a healthy store and records every request.
pub struct RecordingTransport {
    requests: Mutex<Vec<Recorded>>,
    responder: Box<Responder>,
    latency: Box<Latency>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl std::fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("requests", &self.requests.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

pub fn created(request: &Recorded) -> Result<Response<Bytes>, TransportError> {
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header(http::header::ETAG, compute_etag(&request.body))
        .body(Bytes::new())
        .unwrap())
}

pub fn status(code: StatusCode) -> Result<Response<Bytes>, TransportError> {
    Ok(Response::builder().status(code).body(Bytes::new()).unwrap())
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_responder(created)
    }

    pub fn with_responder(
        responder: impl Fn(&Recorded) -> Result<Response<Bytes>, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            latency: Box::new(|_| Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: impl Fn(&Recorded) -> Duration + Send + Sync + 'static) -> Self {
        self.latency = Box::new(latency);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn manifests(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(Recorded::is_manifest).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let (parts, body) = request.into_parts();
        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        };
        self.requests.lock().unwrap().push(recorded.clone());

        let delay = (self.latency)(&recorded);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let response = (self.responder)(&recorded);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// A container named `test` backed by `transport`.
pub fn container(transport: &Arc<RecordingTransport>) -> Container {
    container_with(transport, ClientConfig::builder().storage_url(STORAGE_URL).build())
}

pub fn container_with(transport: &Arc<RecordingTransport>, config: ClientConfig) -> Container {
    Container::new(
        ContainerName::new("test").unwrap(),
        Arc::clone(transport) as Arc<dyn Transport>,
        config,
    )
}

/// A temporary file of `size` bytes with position-dependent content.
pub fn temp_file(size: u64) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut remaining = size;
    let chunk: Vec<u8> = (0..=255u8).cycle().take(1024 * 1024).collect();
    while remaining > 0 {
        let n = remaining.min(chunk.len() as u64) as usize;
        file.write_all(&chunk[..n]).unwrap();
        remaining -= n as u64;
    }
    file.flush().unwrap();
    file
}
