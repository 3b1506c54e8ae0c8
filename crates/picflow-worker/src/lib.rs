//! # picflow-worker
//!
//! The cron scheduler and the reconciliation sweep for orphaned
//! in-flight uploads.

pub mod jobs;
pub mod scheduler;

pub use jobs::reconcile::{ReconcileSweeper, SweepStats};
pub use scheduler::SweepScheduler;
