//! Raw object key generation.
//!
//! Keys are generated here and treated as opaque correlation tokens
//! everywhere else; no component may parse a key back into its parts.

use uuid::Uuid;

use picflow_core::types::UserId;

/// Prefix under which raw (pre-transformation) uploads land.
const RAW_PREFIX: &str = "raw";

/// Build the blob-store key for a new upload:
/// `raw/{userId}-{uuid}-{filename}`.
///
/// The random component makes the key unique even when one user
/// uploads the same filename twice.
pub fn raw_object_key(user_id: UserId, filename: &str) -> String {
    format!("{RAW_PREFIX}/{user_id}-{}-{filename}", Uuid::new_v4())
}
