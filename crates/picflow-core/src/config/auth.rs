//! Authentication configuration.
//!
//! Credential issuance is owned by an external service; PicFlow only
//! validates inbound bearer tokens.

use serde::{Deserialize, Serialize};

/// JWT validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret used to validate access tokens.
    pub jwt_secret: String,
    /// Expected token issuer. Empty disables the issuer check.
    #[serde(default)]
    pub issuer: String,
}
