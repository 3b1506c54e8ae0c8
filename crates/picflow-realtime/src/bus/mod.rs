//! Notification bus transports.
//!
//! Both transports expose the same in-process fan-out: publishers call
//! [`NotificationBus::publish`], every local subscriber holds a
//! `broadcast::Receiver`. The Redis transport additionally relays
//! envelopes across process instances.
//!
//! [`NotificationBus::publish`]: picflow_core::traits::NotificationBus::publish

pub mod memory;
pub mod redis_bus;
