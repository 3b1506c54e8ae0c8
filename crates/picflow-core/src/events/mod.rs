//! Notification events published on the status bus.
//!
//! Envelopes are ephemeral: they are never persisted, and a subscriber
//! that connects after publish never sees the envelope.

pub mod status;

pub use status::{StatusEnvelope, NOTIFICATION_CHANNEL, STATUS_ENVELOPE_TYPE};
