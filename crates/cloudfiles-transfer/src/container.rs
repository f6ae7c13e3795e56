//! Upload entry points bound to one container.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use cloudfiles_core::{ClientConfig, ContainerName, ObjectName};
use cloudfiles_model::{InvalidArgument, ProgressCallback, UploadOptions, UploadOutcome, UploadRequest};

use crate::error::TransferResult;
use crate::manifest::ManifestAssembler;
use crate::orchestrator::Orchestrator;
use crate::planner::{PlannedUpload, plan};
use crate::transport::Transport;
use crate::uploader::ObjectUploader;
use crate::utils;
use crate::validation::MAX_SEGMENT_SIZE;

/// A container in the object store, reached through a caller-supplied
/// transport.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use cloudfiles_core::{ClientConfig, ContainerName};
/// # use cloudfiles_model::UploadOptions;
/// # use cloudfiles_transfer::{Container, Transport};
/// # async fn run(transport: Arc<dyn Transport>) -> cloudfiles_transfer::TransferResult<()> {
/// let container = Container::new(
///     ContainerName::new("backups").unwrap(),
///     transport,
///     ClientConfig::from_env(),
/// );
/// let options = UploadOptions::from_json(serde_json::json!({
///     "name": "db.tar",
///     "path": "/var/backups/db.tar",
///     "partSize": 20 * 1024 * 1024,
///     "concurrency": 3,
/// }))?;
/// let outcome = container.upload_options(options, None).await?;
/// println!("uploaded {} bytes", outcome.bytes_uploaded());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Container {
    name: ContainerName,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Container {
    /// Bind `name` to a transport and client configuration.
    pub fn new(name: ContainerName, transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            name,
            transport,
            config: Arc::new(config),
        }
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &ContainerName {
        &self.name
    }

    /// Client configuration in use.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of `object` in this container.
    #[must_use]
    pub fn object_url(&self, object: &ObjectName) -> String {
        utils::object_url(self.config.base_url(), &self.name, object)
    }

    /// Upload one object, segmenting it when it is larger than the part size.
    ///
    /// # Errors
    ///
    /// See [`TransferError`](crate::TransferError). Input problems are
    /// reported before any request is sent.
    pub async fn upload(&self, request: UploadRequest) -> TransferResult<UploadOutcome> {
        let planned = plan(&request, &self.config).await?;
        self.execute(&planned, request.progress.as_ref()).await
    }

    /// Upload one object described by an option bag.
    ///
    /// # Errors
    ///
    /// As [`Container::upload`]; a missing name or source is
    /// [`TransferError::InvalidArgument`](crate::TransferError::InvalidArgument).
    pub async fn upload_options(
        &self,
        options: UploadOptions,
        progress: Option<ProgressCallback>,
    ) -> TransferResult<UploadOutcome> {
        let mut request = UploadRequest::try_from(options)?;
        request.progress = progress;
        self.upload(request).await
    }

    /// Upload several small objects, each as a single request.
    ///
    /// Every entry is validated and its source opened before the first
    /// request goes out, so one bad entry fails the whole batch without
    /// side effects. Up to the configured default concurrency of uploads run
    /// at once; outcomes are returned in input order.
    ///
    /// # Errors
    ///
    /// [`TransferError::InvalidArgument`](crate::TransferError::InvalidArgument)
    /// for any malformed entry or one too large for a single request, or the
    /// first upload error.
    pub async fn upload_objects(&self, objects: Vec<UploadOptions>) -> TransferResult<Vec<UploadOutcome>> {
        let mut planned = Vec::with_capacity(objects.len());
        for (position, options) in objects.into_iter().enumerate() {
            let mut request = UploadRequest::try_from(options).map_err(|e| {
                InvalidArgument::new(format!("object #{position}: {}", e.message))
            })?;
            request.part_size = Some(MAX_SEGMENT_SIZE);
            let upload = plan(&request, &self.config).await?;
            if upload.plan.is_multipart {
                return Err(InvalidArgument::new(format!(
                    "object #{position} ({}) exceeds {MAX_SEGMENT_SIZE} bytes; upload it on its own",
                    request.name
                ))
                .into());
            }
            planned.push(upload);
        }

        debug!(container = %self.name, count = planned.len(), "uploading object batch");
        let orchestrator = self.orchestrator();
        stream::iter(planned.iter())
            .map(|upload| orchestrator.execute(upload, None))
            .buffered(self.config.default_concurrency.max(1))
            .try_collect()
            .await
    }

    async fn execute(
        &self,
        planned: &PlannedUpload,
        progress: Option<&ProgressCallback>,
    ) -> TransferResult<UploadOutcome> {
        info!(
            container = %self.name,
            object = %planned.plan.object_name,
            size = planned.plan.total_size,
            parts = planned.plan.part_count(),
            "starting upload"
        );
        let outcome = self.orchestrator().execute(planned, progress).await?;
        info!(
            container = %self.name,
            object = %planned.plan.object_name,
            bytes = outcome.bytes_uploaded(),
            segmented = outcome.is_multipart(),
            "upload complete"
        );
        Ok(outcome)
    }

    fn orchestrator(&self) -> Orchestrator {
        let base_url = self.config.base_url();
        let uploader = ObjectUploader::new(Arc::clone(&self.transport), base_url, self.name.clone())
            .verify_checksums(self.config.verify_checksums);
        let assembler = ManifestAssembler::new(Arc::clone(&self.transport), base_url, self.name.clone());
        Orchestrator::new(Arc::new(uploader), assembler)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use crate::TransferError;
    use crate::testing::MockTransport;

    fn container(transport: &Arc<MockTransport>) -> Container {
        Container::new(
            ContainerName::new("test").unwrap(),
            Arc::clone(transport) as Arc<dyn Transport>,
            ClientConfig::builder()
                .storage_url("http://store/v1/AUTH_test/")
                .build(),
        )
    }

    fn named(name: &str) -> UploadOptions {
        UploadOptions {
            name: Some(name.to_owned()),
            ..UploadOptions::default()
        }
    }

    #[test]
    fn test_should_build_object_url() {
        let transport = Arc::new(MockTransport::new());
        let url = container(&transport).object_url(&ObjectName::new("a b/c").unwrap());
        assert_eq!(url, "http://store/v1/AUTH_test/test/a%20b/c");
    }

    #[tokio::test]
    async fn test_should_upload_body_option() {
        let transport = Arc::new(MockTransport::new());
        let outcome = container(&transport)
            .upload_options(
                UploadOptions {
                    body: Some("FOOBAR".to_owned()),
                    ..named("test")
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(outcome.bytes_uploaded(), 6);
        assert_eq!(transport.requests()[0].uri, "http://store/v1/AUTH_test/test/test");
    }

    #[tokio::test]
    async fn test_should_reject_options_before_sending() {
        let transport = Arc::new(MockTransport::new());
        let err = container(&transport)
            .upload_options(
                UploadOptions {
                    path: Some(PathBuf::from("/foo")),
                    ..UploadOptions::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidArgument(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_should_upload_object_batch_in_order() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"from disk").unwrap();

        let transport = Arc::new(MockTransport::new());
        let outcomes = container(&transport)
            .upload_objects(vec![
                UploadOptions {
                    body: Some("foo".to_owned()),
                    ..named("a")
                },
                UploadOptions {
                    path: Some(tmp.path().to_path_buf()),
                    ..named("b")
                },
            ])
            .await
            .unwrap();

        let names: Vec<&str> = outcomes
            .iter()
            .map(|o| o.responses[0].name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(outcomes[1].bytes_uploaded(), 9);
        assert!(outcomes.iter().all(|o| !o.is_multipart()));
    }

    #[tokio::test]
    async fn test_should_reject_batch_with_nameless_entry() {
        let transport = Arc::new(MockTransport::new());
        let err = container(&transport)
            .upload_objects(vec![
                UploadOptions {
                    body: Some("foo".to_owned()),
                    ..named("a")
                },
                UploadOptions {
                    body: Some("bar".to_owned()),
                    ..UploadOptions::default()
                },
            ])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("object #1"));
        assert!(transport.requests().is_empty());
    }
}
