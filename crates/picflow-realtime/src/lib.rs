//! # picflow-realtime
//!
//! Notification bus transports (in-memory and Redis pub/sub) and the
//! realtime status gateway that turns bus subscriptions into per-user
//! event streams.

pub mod bus;
pub mod gateway;

pub use bus::memory::MemoryNotificationBus;
pub use bus::redis_bus::RedisNotificationBus;
pub use gateway::StatusGateway;
