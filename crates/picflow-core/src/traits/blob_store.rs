//! Blob store trait for the external object storage collaborator.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for the blob storage backend.
///
/// PicFlow never reads or writes object bytes itself; clients upload
/// directly via presigned URLs and the external worker reads the raw
/// object. The orchestration layer only probes, deletes, and presigns.
///
/// Object keys are opaque correlation tokens everywhere outside the
/// key-generation path; implementations must not parse them for
/// metadata.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Check whether an object exists at the given key.
    ///
    /// Returns `Ok(true)` if the object exists, `Ok(false)` if the store
    /// definitively reports it absent. Any other probe outcome is an
    /// `Err` and callers must treat it as "unknown", not as absence.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Delete the object at the given key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Generate a presigned PUT URL permitting a direct client upload.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String>;
}
