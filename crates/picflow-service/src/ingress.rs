//! Status ingress: applies worker status reports from the status queue.
//!
//! Every delivery is acknowledged by receipt, so failures here are
//! terminal per message: logged and dropped, never re-queued.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use picflow_broker::MessageHandler;
use picflow_core::error::ErrorKind;
use picflow_entity::wire::StatusMessage;

use crate::transition::TransitionEngine;

/// Consumes worker status reports and drives them through the
/// transition engine.
#[derive(Debug, Clone)]
pub struct StatusIngress {
    engine: TransitionEngine,
}

impl StatusIngress {
    pub fn new(engine: TransitionEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl MessageHandler for StatusIngress {
    async fn handle(&self, payload: Vec<u8>) {
        let message: StatusMessage = match serde_json::from_slice(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping unparseable status message");
                return;
            }
        };

        let target = message.normalized_status();
        let result = self
            .engine
            .apply(
                message.id,
                target,
                message.public_url(),
                message.error_message(),
            )
            .await;

        match result {
            Ok(_) => {}
            Err(e) if e.kind == ErrorKind::DuplicateTransition => {
                debug!(job_id = %message.id, status = %target, "Duplicate status delivery; no-op");
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                warn!(job_id = %message.id, "Status report for unknown job; dropped");
            }
            Err(e) => {
                error!(job_id = %message.id, error = %e, "Failed to apply status report; dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use picflow_core::types::UserId;
    use picflow_entity::job::{CreateJob, JobStatus, JobStore};
    use picflow_entity::transformation::TransformationType;

    use crate::testing::{MemoryJobStore, RecordingBus};

    async fn ingress_with_job() -> (StatusIngress, Arc<MemoryJobStore>, Arc<RecordingBus>, picflow_core::types::JobId) {
        let store = Arc::new(MemoryJobStore::default());
        let bus = Arc::new(RecordingBus::default());
        let job = store
            .create(&CreateJob {
                user_id: UserId::new(),
                filename: "photo.png".into(),
                transformation_type: TransformationType::Convert,
                transformation_parameters: serde_json::json!({ "format": "JPEG" }),
            })
            .await
            .expect("create");
        let ingress = StatusIngress::new(TransitionEngine::new(store.clone(), bus.clone()));
        (ingress, store, bus, job.id)
    }

    fn report(id: picflow_core::types::JobId, user: UserId, status: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "id": id,
            "userId": user,
            "status": status,
        }))
        .expect("encode")
    }

    #[tokio::test]
    async fn test_valid_report_transitions_and_notifies() {
        let (ingress, store, bus, job_id) = ingress_with_job().await;
        let user = store.job(job_id).unwrap().user_id;

        ingress.handle(report(job_id, user, "PROCESSING")).await;

        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Processing);
        assert_eq!(bus.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_report_is_a_noop() {
        let (ingress, store, bus, job_id) = ingress_with_job().await;
        let user = store.job(job_id).unwrap().user_id;

        ingress.handle(report(job_id, user, "PROCESSING")).await;
        ingress.handle(report(job_id, user, "PROCESSING")).await;

        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Processing);
        assert_eq!(bus.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_garbled_status_fails_the_job() {
        let (ingress, store, _bus, job_id) = ingress_with_job().await;
        let user = store.job(job_id).unwrap().user_id;

        ingress.handle(report(job_id, user, "EXPLODED")).await;

        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_unparseable_payload_is_dropped() {
        let (ingress, store, bus, job_id) = ingress_with_job().await;

        ingress.handle(b"not json at all".to_vec()).await;

        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Pending);
        assert!(bus.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_regression_is_rejected() {
        let (ingress, store, bus, job_id) = ingress_with_job().await;
        let user = store.job(job_id).unwrap().user_id;

        ingress.handle(report(job_id, user, "PROCESSED")).await;
        ingress.handle(report(job_id, user, "PROCESSING")).await;

        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Processed);
        assert_eq!(bus.published.lock().unwrap().len(), 1);
    }
}
