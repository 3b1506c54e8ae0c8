//! # picflow-database
//!
//! PostgreSQL database connection management and the concrete
//! [`JobStore`](picflow_entity::job::JobStore) implementation.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
