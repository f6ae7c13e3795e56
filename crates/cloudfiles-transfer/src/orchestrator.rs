//! Concurrent segment transfer.
//!
//! Segments are uploaded through a sliding window of at most `concurrency`
//! in-flight futures, polled on the calling task. Whenever one finishes, the
//! next pending segment starts. Results land in a slot per segment index,
//! so the outcome is in index order whatever order the store answers in.
//!
//! The first failed segment stops dispatch. Segments already in flight run
//! to completion, their results are discarded, and no manifest is written.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use http::HeaderMap;
use tracing::{debug, warn};

use cloudfiles_model::{Part, PartResponse, ProgressCallback, ProgressEvent, UploadOutcome};

use crate::error::{RequestError, TransferError, TransferResult};
use crate::manifest::ManifestAssembler;
use crate::planner::PlannedUpload;
use crate::source::PlannedSource;
use crate::uploader::PartUploader;

type PartFuture<'a> = BoxFuture<'a, (usize, Result<PartResponse, RequestError>)>;

/// Executes planned uploads.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    uploader: Arc<dyn PartUploader>,
    assembler: ManifestAssembler,
}

impl Orchestrator {
    /// Create an orchestrator from a part uploader and a manifest assembler.
    pub fn new(uploader: Arc<dyn PartUploader>, assembler: ManifestAssembler) -> Self {
        Self {
            uploader,
            assembler,
        }
    }

    /// Upload every part of `planned` and, for segmented plans, write the
    /// manifest.
    ///
    /// `progress` is called once per completed part, on the calling task.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Transport`] if a single-request upload cannot reach
    ///   the store.
    /// - [`TransferError::PartUploadFailed`] for the first part that fails.
    /// - [`TransferError::ManifestError`] if every part succeeded but the
    ///   manifest could not be written.
    pub async fn execute(
        &self,
        planned: &PlannedUpload,
        progress: Option<&ProgressCallback>,
    ) -> TransferResult<UploadOutcome> {
        if planned.plan.is_multipart {
            self.execute_segmented(planned, progress).await
        } else {
            self.execute_single(planned, progress).await
        }
    }

    async fn execute_single(
        &self,
        planned: &PlannedUpload,
        progress: Option<&ProgressCallback>,
    ) -> TransferResult<UploadOutcome> {
        let Some(part) = planned.plan.parts.first() else {
            return Err(TransferError::invalid_argument("upload plan has no parts"));
        };

        let response = match self
            .send_part(&planned.source, part, &planned.headers)
            .await
        {
            Ok(response) => response,
            Err(RequestError::Transport(e)) => return Err(TransferError::Transport(e)),
            Err(cause) => return Err(part_failed(part, cause)),
        };

        let mut tracker = ProgressTracker::new(progress, 1, planned.plan.total_size);
        tracker.record(&response);

        Ok(UploadOutcome {
            responses: vec![response],
            manifest: None,
        })
    }

    async fn execute_segmented(
        &self,
        planned: &PlannedUpload,
        progress: Option<&ProgressCallback>,
    ) -> TransferResult<UploadOutcome> {
        let plan = &planned.plan;
        let parts = &plan.parts;
        let source = &planned.source;
        let segment_headers = HeaderMap::new();
        let headers = &segment_headers;
        let dispatch = move |index: usize| {
            let part = &parts[index];
            async move { (index, self.send_part(source, part, headers).await) }.boxed()
        };

        let mut slots: Vec<Option<PartResponse>> = vec![None; parts.len()];
        let mut tracker = ProgressTracker::new(progress, parts.len(), plan.total_size);
        let mut failure: Option<TransferError> = None;

        let mut pending = 0..parts.len();
        let mut in_flight: FuturesUnordered<PartFuture<'_>> = FuturesUnordered::new();
        for index in pending.by_ref().take(plan.concurrency) {
            in_flight.push(dispatch(index));
        }

        while let Some((index, result)) = in_flight.next().await {
            match result {
                Ok(response) => {
                    tracker.record(&response);
                    slots[index] = Some(response);
                }
                Err(cause) => {
                    warn!(
                        object = %plan.object_name,
                        part = index,
                        error = %cause,
                        "part upload failed, no further parts will be started"
                    );
                    if failure.is_none() {
                        failure = Some(part_failed(&parts[index], cause));
                    }
                }
            }

            if failure.is_none() {
                if let Some(next) = pending.next() {
                    in_flight.push(dispatch(next));
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let responses: Vec<PartResponse> = slots.into_iter().flatten().collect();
        debug!(
            object = %plan.object_name,
            part_count = responses.len(),
            bytes = plan.total_size,
            "all parts uploaded"
        );

        let manifest = self
            .assembler
            .assemble(
                &plan.object_name,
                planned.manifest_kind,
                &responses,
                &planned.headers,
            )
            .await?;

        Ok(UploadOutcome {
            responses,
            manifest: Some(manifest),
        })
    }

    async fn send_part(
        &self,
        source: &PlannedSource,
        part: &Part,
        headers: &HeaderMap,
    ) -> Result<PartResponse, RequestError> {
        let body = source.read(part).await?;
        self.uploader.upload_part(part, body, headers).await
    }
}

fn part_failed(part: &Part, cause: RequestError) -> TransferError {
    TransferError::PartUploadFailed {
        index: part.index,
        name: part.name.clone(),
        cause,
    }
}

/// Running totals handed to the progress callback.
struct ProgressTracker<'a> {
    callback: Option<&'a ProgressCallback>,
    total_parts: usize,
    total_bytes: u64,
    completed_parts: usize,
    transferred_bytes: u64,
}

impl<'a> ProgressTracker<'a> {
    fn new(callback: Option<&'a ProgressCallback>, total_parts: usize, total_bytes: u64) -> Self {
        Self {
            callback,
            total_parts,
            total_bytes,
            completed_parts: 0,
            transferred_bytes: 0,
        }
    }

    fn record(&mut self, response: &PartResponse) {
        self.completed_parts += 1;
        self.transferred_bytes += response.size;

        let Some(callback) = self.callback else {
            return;
        };
        let event = ProgressEvent {
            part_index: response.index,
            part_bytes: response.size,
            completed_parts: self.completed_parts,
            total_parts: self.total_parts,
            transferred_bytes: self.transferred_bytes,
            total_bytes: self.total_bytes,
        };
        if catch_unwind(AssertUnwindSafe(|| callback.call(&event))).is_err() {
            warn!(part = response.index, "progress callback panicked, ignoring");
        }
    }
}
