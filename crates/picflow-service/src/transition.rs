//! Shared status transition engine.
//!
//! Both the status ingress and the manual update endpoint run through
//! this one code path, so idempotency and monotonicity rules cannot
//! drift between the two.

use std::sync::Arc;

use tracing::{debug, info, warn};

use picflow_core::error::AppError;
use picflow_core::events::StatusEnvelope;
use picflow_core::result::AppResult;
use picflow_core::traits::NotificationBus;
use picflow_core::types::JobId;
use picflow_entity::job::{JobStatus, JobStore, StatusTransition, TransformJob, TransitionError};

/// How many times a lost optimistic update is re-validated before
/// giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Validates and applies status transitions, then publishes the
/// notification envelope.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    store: Arc<dyn JobStore>,
    bus: Arc<dyn NotificationBus>,
}

impl TransitionEngine {
    pub fn new(store: Arc<dyn JobStore>, bus: Arc<dyn NotificationBus>) -> Self {
        Self { store, bus }
    }

    /// Move a job to `target`, enforcing the monotonic state machine.
    ///
    /// `public_url` is honored only for `PROCESSED`, `error_message`
    /// only for `FAILED`; empty strings are normalized to `None`. When
    /// the conditional update loses to a concurrent writer the current
    /// status is re-read and re-validated, so a duplicate delivered
    /// twice concurrently still resolves to exactly one applied
    /// transition.
    pub async fn apply(
        &self,
        job_id: JobId,
        target: JobStatus,
        public_url: Option<String>,
        error_message: Option<String>,
    ) -> AppResult<TransformJob> {
        let public_url = public_url.filter(|s| !s.is_empty());
        let error_message = error_message.filter(|s| !s.is_empty());

        for attempt in 1..=MAX_ATTEMPTS {
            let job = self
                .store
                .find_by_id(job_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Job {job_id} not found")))?;

            job.status
                .validate_transition(target)
                .map_err(|e| match e {
                    TransitionError::Duplicate(status) => AppError::duplicate_transition(
                        format!("Job {job_id} is already {status}"),
                    ),
                    other => AppError::validation(format!("Job {job_id}: {other}")),
                })?;

            let transition = StatusTransition {
                expected: job.status,
                target,
                public_url: public_url.clone(),
                error_message: error_message.clone(),
            };

            match self.store.apply_transition(job_id, &transition).await? {
                Some(updated) => {
                    info!(
                        job_id = %job_id,
                        from = %job.status,
                        to = %updated.status,
                        "Applied status transition"
                    );
                    self.notify(&updated).await;
                    return Ok(updated);
                }
                None => {
                    debug!(
                        job_id = %job_id,
                        attempt,
                        "Transition lost conditional update; re-validating"
                    );
                }
            }
        }

        Err(AppError::internal(format!(
            "Job {job_id} transition still contended after {MAX_ATTEMPTS} attempts"
        )))
    }

    /// Publish the envelope for an applied transition. Notification is
    /// best-effort: the transition is already committed, so a bus
    /// failure is logged rather than surfaced.
    async fn notify(&self, job: &TransformJob) {
        let envelope = StatusEnvelope::new(
            job.id,
            job.user_id,
            job.status.as_str(),
            job.error_message.clone(),
        );
        if let Err(e) = self.bus.publish(envelope).await {
            warn!(job_id = %job.id, error = %e, "Failed to publish status envelope");
        }
    }
}
