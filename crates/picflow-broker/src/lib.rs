//! # picflow-broker
//!
//! Queue bindings, the Queue Router, the bounded-timeout publisher, and
//! the prefetch-bounded status-queue consumer.

pub mod bindings;
pub mod consumer;
pub mod publisher;
pub mod router;

pub use bindings::{BindingTable, QueueBinding, STATUS_QUEUE};
pub use consumer::{MessageHandler, StatusConsumer};
pub use publisher::RedisQueuePublisher;
pub use router::{QueueRouter, RouteOutcome};
