//! Queue Router: maps a job onto its transformation queue and publishes
//! the work order.

use std::sync::Arc;

use tracing::{error, info};

use picflow_core::error::AppError;
use picflow_core::result::AppResult;
use picflow_core::traits::QueuePublisher;
use picflow_entity::job::TransformJob;
use picflow_entity::wire::WorkOrder;

use crate::bindings::BindingTable;

/// Result of a routing attempt.
///
/// A failed publish is an outcome, not an `Err`: the job record stays
/// untouched for the reconciliation sweep, and the caller decides how
/// to report it.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The work order reached the broker.
    Published {
        /// Queue the order was published to.
        queue: &'static str,
    },
    /// The publish timed out or was refused.
    Failed {
        /// Queue the order was destined for.
        queue: &'static str,
        /// The underlying routing failure.
        error: AppError,
    },
}

/// Routes accepted jobs onto their transformation work queue.
#[derive(Debug, Clone)]
pub struct QueueRouter {
    publisher: Arc<dyn QueuePublisher>,
    bindings: BindingTable,
}

impl QueueRouter {
    pub fn new(publisher: Arc<dyn QueuePublisher>, bindings: BindingTable) -> Self {
        Self {
            publisher,
            bindings,
        }
    }

    /// Publish a work order for `job` onto the queue bound to its
    /// transformation kind.
    ///
    /// Returns `Err` only when no binding exists for the kind (fatal,
    /// `INVALID_TRANSFORMATION`) or the job has no raw object key yet.
    /// Broker-side failures come back as [`RouteOutcome::Failed`].
    pub async fn route(&self, job: &TransformJob) -> AppResult<RouteOutcome> {
        let binding = self.bindings.get(job.transformation_type).ok_or_else(|| {
            AppError::invalid_transformation(format!(
                "No queue binding for transformation '{}'",
                job.transformation_type
            ))
        })?;

        let raw_object_key = job.raw_object_key.clone().ok_or_else(|| {
            AppError::internal(format!("Job {} routed before its object key was set", job.id))
        })?;

        let order = WorkOrder {
            id: job.id,
            user_id: job.user_id,
            filename: job.filename.clone(),
            transformation_type: job.transformation_type,
            transformation_parameters: job.transformation_parameters.clone(),
            raw_object_key,
        };
        let payload = serde_json::to_vec(&order)?;

        match self.publisher.publish(binding.queue_name, &payload).await {
            Ok(()) => {
                info!(
                    job_id = %job.id,
                    queue = binding.queue_name,
                    "Routed job to transformation queue"
                );
                Ok(RouteOutcome::Published {
                    queue: binding.queue_name,
                })
            }
            Err(error) => {
                error!(
                    job_id = %job.id,
                    queue = binding.queue_name,
                    error = %error,
                    "Failed to route job; leaving record for reconciliation"
                );
                Ok(RouteOutcome::Failed {
                    queue: binding.queue_name,
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use picflow_core::types::{JobId, UserId};
    use picflow_entity::job::JobStatus;
    use picflow_entity::transformation::TransformationType;

    #[derive(Debug, Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl QueuePublisher for RecordingPublisher {
        async fn publish(&self, queue: &str, payload: &[u8]) -> AppResult<()> {
            if self.fail {
                return Err(AppError::routing_failure("broker down"));
            }
            self.published
                .lock()
                .unwrap()
                .push((queue.to_string(), payload.to_vec()));
            Ok(())
        }
    }

    fn sample_job(kind: TransformationType) -> TransformJob {
        TransformJob {
            id: JobId::new(),
            user_id: UserId::new(),
            filename: "photo.png".into(),
            status: JobStatus::Uploading,
            transformation_type: kind,
            transformation_parameters: serde_json::json!({ "degree": 90 }),
            raw_object_key: Some("raw/u-1-photo.png".into()),
            public_url: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_route_publishes_to_bound_queue() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = QueueRouter::new(publisher.clone(), BindingTable::standard());

        let job = sample_job(TransformationType::Convert);
        let outcome = router.route(&job).await.expect("route");

        assert!(matches!(outcome, RouteOutcome::Published { queue: "convert_queue" }));
        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);

        let order: WorkOrder = serde_json::from_slice(&published[0].1).expect("decode");
        assert_eq!(order.id, job.id);
        assert_eq!(order.raw_object_key, "raw/u-1-photo.png");
    }

    #[tokio::test]
    async fn test_publish_failure_is_an_outcome_not_an_error() {
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..Default::default()
        });
        let router = QueueRouter::new(publisher, BindingTable::standard());

        let job = sample_job(TransformationType::Rotate);
        let outcome = router.route(&job).await.expect("route returns Ok");
        match outcome {
            RouteOutcome::Failed { queue, error } => {
                assert_eq!(queue, "rotate_queue");
                assert_eq!(error.kind, picflow_core::error::ErrorKind::RoutingFailure);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_route_without_object_key_is_internal_error() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = QueueRouter::new(publisher, BindingTable::standard());

        let mut job = sample_job(TransformationType::Resize);
        job.raw_object_key = None;
        let err = router.route(&job).await.expect_err("must fail");
        assert_eq!(err.kind, picflow_core::error::ErrorKind::Internal);
    }
}
