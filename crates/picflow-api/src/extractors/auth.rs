//! `AuthUser` extractor — pulls the JWT from the Authorization header
//! and validates it. Token issuance is owned by an external service;
//! only the shared-secret validation happens here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use picflow_core::error::AppError;
use picflow_core::types::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims PicFlow cares about; everything else in the token is ignored.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: UserId,
    #[allow(dead_code)]
    exp: usize,
}

/// Extracted authenticated user available in handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The authenticated user's id.
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::from(AppError::authentication("Missing Authorization header")))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ApiError::from(AppError::authentication("Invalid Authorization header format"))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        if !state.config.auth.issuer.is_empty() {
            validation.set_issuer(&[&state.config.auth.issuer]);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.auth.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::from(AppError::authentication(format!("Invalid token: {e}"))))?;

        Ok(AuthUser {
            user_id: data.claims.sub,
        })
    }
}
