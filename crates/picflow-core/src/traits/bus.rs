//! Notification bus trait decoupling status producers from realtime delivery.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::events::StatusEnvelope;
use crate::result::AppResult;

/// A single logical channel multiplexing status envelopes for all users.
///
/// Multiple process instances may publish; each instance maintains
/// exactly one inbound subscription that is fanned out in-process to
/// all locally connected realtime streams. Delivery is best-effort and
/// not persisted: a subscriber connected after publish never sees that
/// envelope.
#[async_trait]
pub trait NotificationBus: Send + Sync + std::fmt::Debug + 'static {
    /// Publish an envelope to all current subscribers.
    async fn publish(&self, envelope: StatusEnvelope) -> AppResult<()>;

    /// Open a new subscription to the in-process fan-out.
    fn subscribe(&self) -> broadcast::Receiver<StatusEnvelope>;
}
