//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface over the object store holding originals and renditions (S3 in
//! production, in-memory for tests).

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::ObjectMeta;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for object storage backends.
///
/// Keys are used verbatim and must pass [`validate_key`](crate::validate_key)
/// before use. Implementations enforce this validation.
///
/// Neither method retries on its own behalf beyond whatever the underlying
/// client does; a failed call is reported straight back to the caller.
///
/// # Examples
///
/// ```
/// use photopress_storage::{ObjectMeta, backend::StorageBackend, error::Result};
///
/// async fn copy_as_jpeg(backend: &dyn StorageBackend, from: &str, to: &str) -> Result<usize> {
///     let data = backend.read(from).await?;
///     backend.write(to, &data, &ObjectMeta::immutable_jpeg()).await?;
///     Ok(data.len())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Read an object's contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the object
    /// does not exist and [`PermissionDenied`](crate::error::ErrorKind::PermissionDenied)
    /// if the credentials may not read it.
    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Write an object, replacing any existing object at the same key.
    async fn write(&self, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()>;
}
