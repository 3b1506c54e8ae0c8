//! Background job implementations.

pub mod reconcile;
