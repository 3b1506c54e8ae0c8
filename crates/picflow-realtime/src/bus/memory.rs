//! In-memory notification bus for single-node deployments.

use async_trait::async_trait;
use tokio::sync::broadcast;

use picflow_core::events::StatusEnvelope;
use picflow_core::result::AppResult;
use picflow_core::traits::NotificationBus;

/// Single-process notification bus over a `tokio::sync::broadcast`
/// channel.
///
/// Delivery is ephemeral: envelopes published with no subscribers are
/// dropped, and a subscriber that lags past the buffer capacity loses
/// the overwritten envelopes.
#[derive(Debug)]
pub struct MemoryNotificationBus {
    sender: broadcast::Sender<StatusEnvelope>,
}

impl MemoryNotificationBus {
    /// Create a bus with the given fan-out buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }
}

#[async_trait]
impl NotificationBus for MemoryNotificationBus {
    async fn publish(&self, envelope: StatusEnvelope) -> AppResult<()> {
        // send() errs only when no subscriber exists, which is fine.
        let _ = self.sender.send(envelope);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEnvelope> {
        self.sender.subscribe()
    }
}
