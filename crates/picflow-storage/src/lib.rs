//! # picflow-storage
//!
//! S3-backed [`BlobStore`](picflow_core::traits::BlobStore)
//! implementation and the raw object key scheme.

pub mod keys;
pub mod s3;

pub use s3::S3BlobStore;
