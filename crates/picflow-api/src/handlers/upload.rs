//! Upload endpoints.

use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use picflow_core::error::AppError;
use picflow_entity::job::TransformJob;
use picflow_service::upload::{CreateUploadRequest, UploadTicket};

use crate::dto::request::{CreateUploadUrlRequest, UpdateStatusQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /upload/url
///
/// Creates the job record and returns a presigned PUT URL.
pub async fn create_upload_url(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateUploadUrlRequest>,
) -> ApiResult<Json<ApiResponse<UploadTicket>>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let parameters = serde_json::to_value(&request.transformation_parameters)?;
    let ticket = state
        .upload
        .create_upload(CreateUploadRequest {
            user_id: user.user_id,
            filename: request.filename,
            content_type: request.mime_type,
            transformation_type: request.transformation_type,
            transformation_parameters: parameters,
        })
        .await?;

    Ok(Json(ApiResponse::ok(ticket)))
}

/// PATCH /upload/status?id&status&errorMsg
///
/// Client-reported status update; runs through the same transition
/// rules as worker reports.
pub async fn update_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<UpdateStatusQuery>,
) -> ApiResult<Json<ApiResponse<TransformJob>>> {
    let job = state
        .upload
        .update_status(query.id, &query.status, query.error_msg)
        .await?;
    Ok(Json(ApiResponse::ok(job)))
}
