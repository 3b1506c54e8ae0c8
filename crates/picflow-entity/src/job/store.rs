//! Job store seam toward the relational record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use picflow_core::result::AppResult;
use picflow_core::types::JobId;

use super::model::{CreateJob, StatusTransition, TransformJob};

/// Create/find/update primitives exposed by the external job store.
///
/// Updates follow optimistic read-then-conditional-update semantics:
/// [`apply_transition`](JobStore::apply_transition) only writes when the
/// stored status still equals the expected one. There is no transactional
/// lock; concurrent writers lose the condition rather than block.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create a new job record in `PENDING` status.
    async fn create(&self, data: &CreateJob) -> AppResult<TransformJob>;

    /// Find a job by id.
    async fn find_by_id(&self, id: JobId) -> AppResult<Option<TransformJob>>;

    /// Find the job whose `raw_object_key` matches the given key.
    async fn find_by_raw_key(&self, key: &str) -> AppResult<Option<TransformJob>>;

    /// Record the blob-store key for the uploaded source. Set exactly
    /// once, after presigned-URL issuance.
    async fn set_raw_object_key(&self, id: JobId, key: &str) -> AppResult<()>;

    /// Conditionally apply a status transition.
    ///
    /// Returns the updated record, or `None` when the condition failed
    /// because another writer moved the status first.
    async fn apply_transition(
        &self,
        id: JobId,
        transition: &StatusTransition,
    ) -> AppResult<Option<TransformJob>>;

    /// Find jobs stuck in `UPLOADING` whose `updated_at` is at or
    /// before the threshold.
    async fn find_stuck_uploads(
        &self,
        threshold: DateTime<Utc>,
    ) -> AppResult<Vec<TransformJob>>;

    /// Delete a job record. Returns `true` if a row was removed.
    async fn delete(&self, id: JobId) -> AppResult<bool>;
}
