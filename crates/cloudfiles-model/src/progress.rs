//! Progress reporting for uploads.

use std::fmt;
use std::sync::Arc;

/// Snapshot handed to the progress callback after each segment completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Index of the segment that just finished.
    pub part_index: usize,
    /// Bytes carried by that segment.
    pub part_bytes: u64,
    /// Segments finished so far, including this one.
    pub completed_parts: usize,
    /// Segments in the plan.
    pub total_parts: usize,
    /// Bytes finished so far, including this segment.
    pub transferred_bytes: u64,
    /// Size of the whole upload.
    pub total_bytes: u64,
}

impl ProgressEvent {
    /// Completed fraction in `[0.0, 1.0]`; an empty upload counts as done.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            self.transferred_bytes as f64 / self.total_bytes as f64
        }
    }
}

/// Callback invoked once per completed segment.
///
/// Delivered on the task driving the upload. A panic inside the callback is
/// caught and logged; it never aborts the transfer.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&ProgressEvent) + Send + Sync>);

impl ProgressCallback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&ProgressEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &ProgressEvent) {
        (self.0)(event);
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressCallback")
    }
}
