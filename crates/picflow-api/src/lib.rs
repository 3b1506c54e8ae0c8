//! # picflow-api
//!
//! HTTP API layer for PicFlow built on Axum: upload endpoints, the
//! webhook intake endpoint, the SSE status stream, middleware,
//! extractors, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
