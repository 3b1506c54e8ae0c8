//! Upload slot creation and the manual status update path.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use picflow_core::error::AppError;
use picflow_core::result::AppResult;
use picflow_core::traits::BlobStore;
use picflow_core::types::{JobId, UserId};
use picflow_entity::job::{CreateJob, JobStatus, JobStore, TransformJob};
use picflow_entity::transformation::TransformationType;
use picflow_storage::keys::raw_object_key;

use crate::transition::TransitionEngine;

/// Validated input for creating an upload slot.
#[derive(Debug, Clone)]
pub struct CreateUploadRequest {
    pub user_id: UserId,
    pub filename: String,
    pub content_type: String,
    pub transformation_type: TransformationType,
    pub transformation_parameters: serde_json::Value,
}

/// The client's ticket for performing the upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// The created job.
    pub id: JobId,
    /// Presigned PUT URL the client uploads the source object to.
    pub presigned_url: String,
    /// Echo of the original filename.
    pub filename: String,
}

/// Creates upload slots and applies client-driven status updates.
#[derive(Debug, Clone)]
pub struct UploadService {
    store: Arc<dyn JobStore>,
    blobs: Arc<dyn BlobStore>,
    engine: TransitionEngine,
    presign_expiry: Duration,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        engine: TransitionEngine,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            store,
            blobs,
            engine,
            presign_expiry,
        }
    }

    /// Create a `PENDING` job and hand back a presigned upload URL.
    ///
    /// The object key is persisted before the URL is returned, so the
    /// webhook can always correlate the upload-success event even when
    /// it races the HTTP response.
    pub async fn create_upload(&self, request: CreateUploadRequest) -> AppResult<UploadTicket> {
        let job = self
            .store
            .create(&CreateJob {
                user_id: request.user_id,
                filename: request.filename.clone(),
                transformation_type: request.transformation_type,
                transformation_parameters: request.transformation_parameters,
            })
            .await?;

        let key = raw_object_key(request.user_id, &request.filename);
        self.store.set_raw_object_key(job.id, &key).await?;

        let presigned_url = self
            .blobs
            .presign_put(&key, &request.content_type, self.presign_expiry)
            .await?;

        info!(
            job_id = %job.id,
            user_id = %request.user_id,
            transformation = %request.transformation_type,
            "Created upload slot"
        );

        Ok(UploadTicket {
            id: job.id,
            presigned_url,
            filename: request.filename,
        })
    }

    /// Client-reported status update (for example `UPLOADING` once the
    /// PUT begins). Shares the transition engine with the status
    /// ingress, so the same idempotency and monotonicity rules apply.
    ///
    /// Unlike worker reports, the status is parsed strictly: a typo in
    /// client input is rejected, never coerced to `FAILED`.
    pub async fn update_status(
        &self,
        job_id: JobId,
        raw_status: &str,
        error_message: Option<String>,
    ) -> AppResult<TransformJob> {
        let target: JobStatus = raw_status
            .parse()
            .map_err(|e: String| AppError::validation(e))?;
        self.engine.apply(job_id, target, None, error_message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use picflow_core::error::ErrorKind;

    use crate::testing::{MemoryJobStore, RecordingBus};

    #[derive(Debug, Default)]
    struct FakeBlobStore {
        presigned: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(true)
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        async fn presign_put(
            &self,
            key: &str,
            _content_type: &str,
            _expires_in: Duration,
        ) -> AppResult<String> {
            self.presigned.lock().unwrap().push(key.to_string());
            Ok(format!("https://blobs.example.com/{key}?sig=abc"))
        }
    }

    fn service() -> (UploadService, Arc<MemoryJobStore>, Arc<RecordingBus>) {
        let store = Arc::new(MemoryJobStore::default());
        let bus = Arc::new(RecordingBus::default());
        let engine = TransitionEngine::new(store.clone(), bus.clone());
        let upload = UploadService::new(
            store.clone(),
            Arc::new(FakeBlobStore::default()),
            engine,
            Duration::from_secs(300),
        );
        (upload, store, bus)
    }

    fn sample_request() -> CreateUploadRequest {
        CreateUploadRequest {
            user_id: UserId::new(),
            filename: "photo.png".into(),
            content_type: "image/png".into(),
            transformation_type: TransformationType::Resize,
            transformation_parameters: serde_json::json!({ "width": 800, "height": 600 }),
        }
    }

    #[tokio::test]
    async fn test_create_upload_persists_key_and_presigns_it() {
        let (upload, store, _bus) = service();

        let ticket = upload.create_upload(sample_request()).await.expect("create");

        let job = store.job(ticket.id).expect("job exists");
        assert_eq!(job.status, JobStatus::Pending);
        let key = job.raw_object_key.expect("key persisted");
        assert!(key.starts_with("raw/"));
        assert!(ticket.presigned_url.contains(&key));
    }

    #[tokio::test]
    async fn test_update_status_moves_job_and_notifies() {
        let (upload, _store, bus) = service();
        let ticket = upload.create_upload(sample_request()).await.expect("create");

        let job = upload
            .update_status(ticket.id, "UPLOADING", None)
            .await
            .expect("update");

        assert_eq!(job.status, JobStatus::Uploading);
        assert_eq!(bus.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_manual_status_is_rejected_not_coerced() {
        let (upload, store, bus) = service();
        let ticket = upload.create_upload(sample_request()).await.expect("create");

        let err = upload
            .update_status(ticket.id, "PROCESED", None)
            .await
            .expect_err("typo must be rejected");
        assert_eq!(err.kind, ErrorKind::Validation);

        // The job is untouched and nothing was published.
        let job = store.job(ticket.id).expect("job exists");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(bus.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_manual_update_is_rejected() {
        let (upload, _store, _bus) = service();
        let ticket = upload.create_upload(sample_request()).await.expect("create");
        upload
            .update_status(ticket.id, "UPLOADING", None)
            .await
            .expect("first update");

        let err = upload
            .update_status(ticket.id, "UPLOADING", None)
            .await
            .expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::DuplicateTransition);
    }
}
