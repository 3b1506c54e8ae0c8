//! In-memory collaborator doubles shared by this crate's tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;

use picflow_core::error::AppError;
use picflow_core::events::StatusEnvelope;
use picflow_core::result::AppResult;
use picflow_core::traits::NotificationBus;
use picflow_core::types::JobId;
use picflow_entity::job::{
    CreateJob, JobStatus, JobStore, StatusTransition, TransformJob,
};

/// In-memory job store with the same conditional-update semantics as
/// the Postgres repository.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: DashMap<JobId, TransformJob>,
}

impl MemoryJobStore {
    pub fn job(&self, id: JobId) -> Option<TransformJob> {
        self.jobs.get(&id).map(|j| j.clone())
    }

    pub fn insert(&self, job: TransformJob) {
        self.jobs.insert(job.id, job);
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<TransformJob> {
        let now = Utc::now();
        let job = TransformJob {
            id: JobId::new(),
            user_id: data.user_id,
            filename: data.filename.clone(),
            status: JobStatus::Pending,
            transformation_type: data.transformation_type,
            transformation_parameters: data.transformation_parameters.clone(),
            raw_object_key: None,
            public_url: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<TransformJob>> {
        Ok(self.jobs.get(&id).map(|j| j.clone()))
    }

    async fn find_by_raw_key(&self, key: &str) -> AppResult<Option<TransformJob>> {
        Ok(self
            .jobs
            .iter()
            .find(|j| j.raw_object_key.as_deref() == Some(key))
            .map(|j| j.clone()))
    }

    async fn set_raw_object_key(&self, id: JobId, key: &str) -> AppResult<()> {
        let mut job = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
        if job.raw_object_key.is_some() {
            return Err(AppError::internal(format!("Job {id} key already set")));
        }
        job.raw_object_key = Some(key.to_string());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn apply_transition(
        &self,
        id: JobId,
        transition: &StatusTransition,
    ) -> AppResult<Option<TransformJob>> {
        let mut job = match self.jobs.get_mut(&id) {
            Some(job) => job,
            None => return Ok(None),
        };
        if job.status != transition.expected {
            return Ok(None);
        }
        job.status = transition.target;
        job.public_url = if transition.target == JobStatus::Processed {
            transition.public_url.clone()
        } else {
            None
        };
        job.error_message = if transition.target == JobStatus::Failed {
            transition.error_message.clone()
        } else {
            None
        };
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn find_stuck_uploads(
        &self,
        threshold: DateTime<Utc>,
    ) -> AppResult<Vec<TransformJob>> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Uploading && j.updated_at <= threshold)
            .map(|j| j.clone())
            .collect())
    }

    async fn delete(&self, id: JobId) -> AppResult<bool> {
        Ok(self.jobs.remove(&id).is_some())
    }
}

/// Bus double capturing published envelopes.
#[derive(Debug)]
pub struct RecordingBus {
    pub published: Mutex<Vec<StatusEnvelope>>,
    sender: broadcast::Sender<StatusEnvelope>,
}

impl Default for RecordingBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            published: Mutex::new(Vec::new()),
            sender,
        }
    }
}

#[async_trait]
impl NotificationBus for RecordingBus {
    async fn publish(&self, envelope: StatusEnvelope) -> AppResult<()> {
        self.published.lock().unwrap().push(envelope.clone());
        let _ = self.sender.send(envelope);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEnvelope> {
        self.sender.subscribe()
    }
}
