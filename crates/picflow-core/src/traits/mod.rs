//! Core traits defined in `picflow-core` and implemented by other crates.
//!
//! These are the seams toward external collaborators: the blob store,
//! the message broker, and the notification bus. The job-store seam is
//! defined in `picflow-entity` next to the entity it is typed by.

pub mod blob_store;
pub mod bus;
pub mod queue;

pub use blob_store::BlobStore;
pub use bus::NotificationBus;
pub use queue::QueuePublisher;
