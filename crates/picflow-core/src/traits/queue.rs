//! Work-queue publisher trait for the message broker collaborator.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for publishing payloads onto named durable work queues.
///
/// Implementations enforce a bounded wait for broker acknowledgment;
/// a timeout or broker refusal surfaces as an `Err` with kind
/// `RoutingFailure`. Publishes are **not** retried automatically — a
/// blind retry risks duplicate worker execution with side effects.
#[async_trait]
pub trait QueuePublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a serialized payload to the named queue, waiting at most
    /// the implementation's configured acknowledgment timeout.
    async fn publish(&self, queue: &str, payload: &[u8]) -> AppResult<()>;
}
