//! Wire message shapes exchanged with the external worker processes.

use serde::{Deserialize, Serialize};

use picflow_core::types::{JobId, UserId};

use crate::job::JobStatus;

/// Status report published by a worker onto the shared status queue.
///
/// The raw `status` string is normalized with
/// [`JobStatus::from_wire_lossy`]: workers are external and a garbled
/// value must degrade to `FAILED` rather than wedge the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    /// The job the report refers to.
    pub id: JobId,
    /// The job's owner, echoed by the worker.
    pub user_id: UserId,
    /// Raw status value as sent by the worker.
    pub status: String,
    /// Output URL, expected only alongside `PROCESSED`.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Failure detail, expected only alongside `FAILED`.
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl StatusMessage {
    /// Normalized form of the raw status field.
    pub fn normalized_status(&self) -> JobStatus {
        JobStatus::from_wire_lossy(&self.status)
    }

    /// Failure detail with the empty string normalized to `None`.
    pub fn error_message(&self) -> Option<String> {
        self.error_msg
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Output URL with the empty string normalized to `None`.
    pub fn public_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Payload published onto a transformation work queue.
///
/// A transient, non-authoritative copy of the job record; the job store
/// stays the single owner of persistent state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    /// The job to process.
    pub id: JobId,
    /// The job's owner.
    pub user_id: UserId,
    /// Original file name.
    pub filename: String,
    /// Transformation kind, matching the queue the order is routed to.
    pub transformation_type: crate::transformation::TransformationType,
    /// Opaque parameters for the worker.
    pub transformation_parameters: serde_json::Value,
    /// Blob-store key of the uploaded source object.
    pub raw_object_key: String,
}
