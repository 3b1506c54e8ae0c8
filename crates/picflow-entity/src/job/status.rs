//! Job status enumeration and transition rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a transformation job.
///
/// Observed transitions form a non-decreasing path through
/// `PENDING → UPLOADING → PROCESSING → {PROCESSED | FAILED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Record created, presigned URL issued, upload not yet started.
    Pending,
    /// Client upload in flight (or abandoned — see the sweeper).
    Uploading,
    /// Routed to a transformation queue; the external worker owns it.
    Processing,
    /// Terminal: the worker produced an output object.
    Processed,
    /// Terminal: the worker reported a failure.
    Failed,
}

/// Why a proposed status transition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The target equals the current status (duplicate re-delivery).
    #[error("status is already {0}")]
    Duplicate(JobStatus),
    /// The current status is terminal; nothing may leave it.
    #[error("job already reached terminal status {0}")]
    Terminal(JobStatus),
    /// The target would move the status backward.
    #[error("cannot move backward from {current} to {target}")]
    Backward {
        /// The status on record.
        current: JobStatus,
        /// The rejected target.
        target: JobStatus,
    },
}

impl JobStatus {
    /// Check whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }

    /// Position of this status on the monotonic path.
    ///
    /// `Processed` and `Failed` share a rank: they are alternative
    /// terminal outcomes, never ordered relative to each other.
    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Uploading => 1,
            Self::Processing => 2,
            Self::Processed | Self::Failed => 3,
        }
    }

    /// Validate a proposed transition from `self` to `target`.
    ///
    /// Duplicate, terminal-escaping, and backward transitions are all
    /// rejected; forward jumps that skip intermediate statuses are
    /// allowed since broker deliveries may collapse steps.
    pub fn validate_transition(&self, target: JobStatus) -> Result<(), TransitionError> {
        if *self == target {
            return Err(TransitionError::Duplicate(target));
        }
        if self.is_terminal() {
            return Err(TransitionError::Terminal(*self));
        }
        if target.rank() <= self.rank() {
            return Err(TransitionError::Backward {
                current: *self,
                target,
            });
        }
        Ok(())
    }

    /// Parse the wire form of a status, normalizing anything
    /// unrecognized to `Failed`.
    ///
    /// Worker processes are outside this codebase; a garbled or
    /// unknown status value must not wedge the pipeline.
    pub fn from_wire_lossy(raw: &str) -> Self {
        match raw {
            "PENDING" => Self::Pending,
            "UPLOADING" => Self::Uploading,
            "PROCESSING" => Self::Processing,
            "PROCESSED" => Self::Processed,
            _ => Self::Failed,
        }
    }

    /// Return the status in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Uploading => "UPLOADING",
            Self::Processing => "PROCESSING",
            Self::Processed => "PROCESSED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    /// Strict parse of the wire form, for client-supplied input where
    /// a typo must be rejected rather than coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "UPLOADING" => Ok(Self::Uploading),
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown status: '{other}'")),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
