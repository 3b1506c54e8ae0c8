//! # picflow-service
//!
//! Orchestration services: upload slot creation, webhook intake,
//! status ingress, and the shared status transition engine.

pub mod ingress;
pub mod transition;
pub mod upload;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use ingress::StatusIngress;
pub use transition::TransitionEngine;
pub use upload::{CreateUploadRequest, UploadService, UploadTicket};
pub use webhook::{SnsEnvelope, WebhookService};
