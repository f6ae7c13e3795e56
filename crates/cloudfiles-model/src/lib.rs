//! Upload request, plan, progress, and outcome types for cloudfiles.
//!
//! These types describe a large-object upload from the caller's option bag
//! through to the per-segment responses. They carry no I/O; planning and
//! transfer live in `cloudfiles-transfer`.

pub mod error;
pub mod options;
pub mod outcome;
pub mod plan;
pub mod progress;
pub mod request;

pub use error::InvalidArgument;
pub use options::UploadOptions;
pub use outcome::{ManifestResponse, PartResponse, UploadOutcome};
pub use plan::{Part, UploadPlan};
pub use progress::{ProgressCallback, ProgressEvent};
pub use request::{EntityRef, UploadRequest};
