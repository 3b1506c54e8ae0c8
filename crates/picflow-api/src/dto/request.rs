//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use picflow_core::types::JobId;
use picflow_entity::transformation::{TransformationParameters, TransformationType};

/// `POST /upload/url` request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadUrlRequest {
    /// Original file name.
    #[validate(length(min = 1, message = "Filename is required"))]
    pub filename: String,
    /// MIME type of the file the client will upload.
    #[validate(length(min = 1, message = "Mime type is required"))]
    pub mime_type: String,
    /// Transformation to apply; unknown kinds are rejected at parse
    /// time.
    pub transformation_type: TransformationType,
    /// Transformation parameters; bounds checked here, opaque after.
    #[validate(nested)]
    pub transformation_parameters: TransformationParameters,
}

/// `PATCH /upload/status` query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusQuery {
    /// The job to update.
    pub id: JobId,
    /// Target status in wire form.
    pub status: String,
    /// Failure detail, for `FAILED` targets.
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_parses_camel_case() {
        let raw = r#"{
            "filename": "photo.png",
            "mimeType": "image/png",
            "transformationType": "ROTATE",
            "transformationParameters": { "degree": 90 }
        }"#;
        let request: CreateUploadUrlRequest = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(request.transformation_type, TransformationType::Rotate);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_degree_fails_validation() {
        let raw = r#"{
            "filename": "photo.png",
            "mimeType": "image/png",
            "transformationType": "ROTATE",
            "transformationParameters": { "degree": 45 }
        }"#;
        let request: CreateUploadUrlRequest = serde_json::from_str(raw).expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_filename_fails_validation() {
        let raw = r#"{
            "filename": "",
            "mimeType": "image/png",
            "transformationType": "CONVERT",
            "transformationParameters": { "format": "JPEG" }
        }"#;
        let request: CreateUploadUrlRequest = serde_json::from_str(raw).expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_transformation_is_rejected_at_parse() {
        let raw = r#"{
            "filename": "photo.png",
            "mimeType": "image/png",
            "transformationType": "SHARPEN",
            "transformationParameters": {}
        }"#;
        assert!(serde_json::from_str::<CreateUploadUrlRequest>(raw).is_err());
    }
}
