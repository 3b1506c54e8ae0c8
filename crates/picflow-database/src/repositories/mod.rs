//! Concrete repository implementations.

pub mod job;

pub use job::TransformJobRepository;
