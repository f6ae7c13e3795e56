//! Large-object uploads for a Swift-style object store.
//!
//! This crate decides whether an upload goes out as one request or as a set
//! of segments, uploads segments with bounded concurrency, and registers a
//! manifest that stitches them back into one object.
//!
//! # Architecture
//!
//! ```text
//! Container::upload(UploadRequest)
//!        |
//!        v
//!   planner::plan          (validation, segment boundaries, source resolution)
//!        |
//!        v
//!   Orchestrator::execute  (sliding window of PartUploader calls, progress)
//!        |
//!        v
//!   ManifestAssembler      (dynamic or static manifest)
//!        |
//!        v
//!   dyn Transport          (supplied by the caller)
//! ```

pub mod checksums;
pub mod container;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod planner;
pub mod source;
pub mod transport;
pub mod uploader;
pub mod utils;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use container::Container;
pub use error::{RequestError, TransferError, TransferResult};
pub use manifest::ManifestAssembler;
pub use orchestrator::Orchestrator;
pub use planner::{PlannedUpload, plan, plan_options};
pub use source::PlannedSource;
pub use transport::{Transport, TransportError};
pub use uploader::{ObjectUploader, PartUploader};
