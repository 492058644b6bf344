//! S3-compatible storage backend.
//!
//! This module provides a storage backend implementation for S3-compatible
//! services including AWS S3, MinIO, and others.
//!
//! # Credentials
//!
//! Credentials are provided explicitly via configuration (`storage.key_id`
//! and `storage.key_secret`, or the `AWS_ACCESS_KEY_ID` and
//! `AWS_SECRET_ACCESS_KEY` environment variables).

use crate::{
    ObjectMeta, StorageBackend,
    error::{Error, ErrorKind, Result},
    validate_key,
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::ByteStream,
};
use exn::ResultExt;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::instrument;

/// The pipeline is sequential, but the backend is shared; keep a ceiling on
/// in-flight requests anyway.
const DEFAULT_CONCURRENT_REQUESTS: usize = 16;

/// S3-compatible storage backend.
///
/// Stores objects in a single bucket; keys are used verbatim.
///
/// # Examples
///
/// ```no_run
/// use photopress_storage::backend::S3Backend;
///
/// let backend = S3Backend::new(
///     "media",
///     "skyfire-media-files",
///     "us-east-1",
///     None::<String>,
///     "access_key_id",
///     "secret_access_key",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    /// Rate limiter for concurrent S3 requests.
    rate_limiter: Arc<Semaphore>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in logging)
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region or provider-specific region
    /// * `endpoint` - Custom endpoint URL for S3-compatible services
    /// * `key_id` - AWS/provider access key ID
    /// * `key_secret` - AWS/provider secret access key
    pub fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        let credentials = Credentials::new(key_id, key_secret, None, None, "photopress-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region.into()))
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4));
        // Custom endpoints (MinIO etc.) generally only understand path-style
        // addressing; AWS itself keeps the virtual-hosted default.
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url).force_path_style(true);
        }
        Self::from_client(name, Client::from_conf(config_builder.build()), bucket)
    }

    /// Wrap an already-configured client.
    pub fn from_client(name: impl Into<String>, client: Client, bucket: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            bucket: bucket.into(),
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        }
    }

    /// Acquire a rate limiter permit before making an S3 API call.
    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        self.rate_limiter
            .clone()
            .acquire_owned()
            .await
            .or_raise(|| ErrorKind::BackendError("S3 request limiter closed".to_string()))
    }
}

/// Map an SDK error onto the actionable storage error categories, keeping
/// the SDK error as the child of the raised frame.
fn classify<E>(err: E, key: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let kind = match err.code() {
        Some("NoSuchKey" | "NotFound") => ErrorKind::NotFound(key.to_string()),
        Some("AccessDenied" | "Forbidden" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
            ErrorKind::PermissionDenied(key.to_string())
        },
        _ => ErrorKind::Network(DisplayErrorContext(&err).to_string()),
    };
    exn::Exn::from(err).raise(kind)
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(backend = %self.name, bucket = %self.bucket))]
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let key = validate_key(key)?;
        let _permit = self.acquire_permit().await?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, key))?;
        // An interrupted transfer surfaces here, after the response headers.
        let body = output
            .body
            .collect()
            .await
            .or_raise(|| ErrorKind::Network(format!("transfer interrupted: {key}")))?;
        Ok(body.into_bytes().to_vec())
    }

    #[instrument(skip(self, data, meta), fields(backend = %self.name, bucket = %self.bucket, size = data.len()))]
    async fn write(&self, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()> {
        let key = validate_key(key)?;
        let _permit = self.acquire_permit().await?;
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(&meta.content_type);
        if let Some(cache_control) = &meta.cache_control {
            request = request.cache_control(cache_control);
        }
        request.send().await.map_err(|e| classify(e, key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> S3Backend {
        S3Backend::new("test", "skyfire-media-files", "us-east-1", Some("http://127.0.0.1:9"), "id", "secret")
    }

    #[tokio::test]
    async fn test_unusable_keys_never_reach_the_network() {
        let backend = backend();
        let err = backend.read("uploads/x/../IMG_0001.jpg").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(k) if k == "uploads/x/../IMG_0001.jpg"));
        let err = backend.write("", b"x", &ObjectMeta::immutable_jpeg()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(_)));
    }
}
