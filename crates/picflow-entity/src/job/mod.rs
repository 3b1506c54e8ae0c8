//! Transformation job entity, status state machine, and store seam.

pub mod model;
pub mod status;
pub mod store;

pub use model::{CreateJob, StatusTransition, TransformJob};
pub use status::{JobStatus, TransitionError};
pub use store::JobStore;
