//! Status notification envelope.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, UserId};

/// Discriminator value carried in every status envelope.
pub const STATUS_ENVELOPE_TYPE: &str = "status";

/// Logical channel name multiplexing status envelopes for all users.
pub const NOTIFICATION_CHANNEL: &str = "notification";

/// The ephemeral message carrying a job's status to realtime subscribers.
///
/// One envelope is published per successful status transition. The
/// `status` field carries the wire form of the job status (for example
/// `"PROCESSING"`); the entity-level enum stays in `picflow-entity` so
/// this crate remains dependency-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    /// The job this envelope describes.
    pub job_id: JobId,
    /// The job's owner; realtime streams filter on this field.
    pub user_id: UserId,
    /// Wire form of the job status.
    pub status: String,
    /// Envelope discriminator, always `"status"`.
    #[serde(rename = "type", default = "default_envelope_type")]
    pub kind: String,
    /// Failure detail, present only for `FAILED` transitions.
    pub error_msg: Option<String>,
}

impl StatusEnvelope {
    /// Build an envelope for a job status transition.
    pub fn new(
        job_id: JobId,
        user_id: UserId,
        status: impl Into<String>,
        error_msg: Option<String>,
    ) -> Self {
        Self {
            job_id,
            user_id,
            status: status.into(),
            kind: STATUS_ENVELOPE_TYPE.to_string(),
            error_msg,
        }
    }
}

fn default_envelope_type() -> String {
    STATUS_ENVELOPE_TYPE.to_string()
}
