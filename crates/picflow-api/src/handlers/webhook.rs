//! Webhook intake endpoint.

use axum::extract::State;
use axum::http::StatusCode;

use picflow_core::error::AppError;
use picflow_service::webhook::SnsEnvelope;

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /webhook/upload-success
///
/// The notification service posts with a text content type, so the
/// body arrives as a raw string and is parsed here.
pub async fn upload_success(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<StatusCode> {
    let envelope: SnsEnvelope = serde_json::from_str(&body)
        .map_err(|e| AppError::validation(format!("Unparseable webhook payload: {e}")))?;

    state.webhook.handle(envelope).await;
    Ok(StatusCode::OK)
}
