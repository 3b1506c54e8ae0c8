//! Maps domain `AppError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use picflow_core::error::{AppError, ErrorKind};

/// Handler result type; `?` lifts any `AppError` into the HTTP layer.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-layer wrapper around [`AppError`].
///
/// Handlers and extractors return this so the domain error can carry
/// an `IntoResponse` implementation.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self(AppError::from(error))
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// HTTP status code, echoed in the body.
    pub status_code: u16,
    /// Human-readable message.
    pub message: String,
    /// Always `false` for errors.
    pub success: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = match &error.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::DuplicateTransition => StatusCode::CONFLICT,
            ErrorKind::RoutingFailure | ErrorKind::Infrastructure => StatusCode::BAD_GATEWAY,
            ErrorKind::InvalidTransformation
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server-side failures keep their detail in the logs only.
        let message = if status.is_server_error() {
            tracing::error!(kind = %error.kind, error = %error, "Request failed");
            "Internal server error".to_string()
        } else {
            error.message.clone()
        };

        let body = ApiErrorResponse {
            status_code: status.as_u16(),
            message,
            success: false,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_shape() {
        let body = ApiErrorResponse {
            status_code: 404,
            message: "Job not found".into(),
            success: false,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Job not found");
    }

    #[test]
    fn test_kind_to_status_mapping() {
        let response = ApiError::from(AppError::not_found("Job not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            ApiError::from(AppError::duplicate_transition("status is already PROCESSED"))
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::from(AppError::internal("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
