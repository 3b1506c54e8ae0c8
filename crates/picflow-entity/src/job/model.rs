//! Transformation job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use picflow_core::types::{JobId, UserId};

use super::status::JobStatus;
use crate::transformation::TransformationType;

/// One image transformation job, owned exclusively by the job store.
///
/// All other components hold only the `id` plus a transient,
/// non-authoritative copy of the fields needed for routing or
/// notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransformJob {
    /// Unique job identifier, generated at creation, immutable.
    pub id: JobId,
    /// Owner, immutable.
    pub user_id: UserId,
    /// Original client-supplied file name, immutable.
    pub filename: String,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Kind of transformation, set at creation, immutable.
    pub transformation_type: TransformationType,
    /// Opaque parameter blob interpreted only by the external worker.
    pub transformation_parameters: serde_json::Value,
    /// Blob-store key of the uploaded source; set exactly once after
    /// presigned-URL issuance.
    pub raw_object_key: Option<String>,
    /// Output URL; set only on transition to `PROCESSED`.
    pub public_url: Option<String>,
    /// Failure detail; set only on transition to `FAILED`.
    pub error_message: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated (store-maintained).
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Owner of the job.
    pub user_id: UserId,
    /// Original file name.
    pub filename: String,
    /// Kind of transformation to apply.
    pub transformation_type: TransformationType,
    /// Opaque parameters for the worker.
    pub transformation_parameters: serde_json::Value,
}

/// A validated status transition ready to be applied to the store.
///
/// `public_url` is honored only when `target` is `PROCESSED`,
/// `error_message` only when `target` is `FAILED`; the store
/// implementation nulls the other column either way.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    /// The status the caller observed before validating; the store
    /// applies the update conditionally against this value.
    pub expected: JobStatus,
    /// The status to transition to.
    pub target: JobStatus,
    /// Output URL, for `PROCESSED` targets.
    pub public_url: Option<String>,
    /// Failure detail, for `FAILED` targets.
    pub error_message: Option<String>,
}
