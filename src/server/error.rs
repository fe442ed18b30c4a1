//! HTTP error mapping.
//!
//! Each variant names the pipeline stage that failed. The response body is
//! always `{"error": "<message>"}`; dependency failures add `details`.

use crate::error::GradeCheckError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Errors returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No usable `file` field in the multipart body.
    NoFile,
    /// The upload exceeded the body limit.
    PayloadTooLarge { limit: usize },
    /// Writing the upload to disk failed.
    Save(GradeCheckError),
    /// Rasterisation or OCR failed.
    Processing(GradeCheckError),
    /// Token, HTTP, response-shape or reply-parsing failure.
    Inference(GradeCheckError),
    /// A health-check binary is missing or broken.
    Dependency(GradeCheckError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Save(_)
            | ApiError::Processing(_)
            | ApiError::Inference(_)
            | ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The human-readable `error` field.
    pub fn message(&self) -> String {
        match self {
            ApiError::NoFile => "No file uploaded.".to_string(),
            ApiError::PayloadTooLarge { limit } => {
                format!("Uploaded file exceeds the {limit} byte limit.")
            }
            ApiError::Save(e) => format!("Could not save file: {e}"),
            ApiError::Processing(e) => format!("Error processing the PDF: {e}"),
            ApiError::Inference(e) => format!("Error from Hugging Face inference: {e}"),
            ApiError::Dependency(_) => "Dependency check failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        let body = match &self {
            ApiError::Dependency(e) => {
                error!("{}: {}", message, e);
                json!({ "error": message, "details": e.to_string() })
            }
            _ if status.is_server_error() => {
                error!("{}", message);
                json!({ "error": message })
            }
            _ => {
                warn!("{}", message);
                json!({ "error": message })
            }
        };

        (status, Json(body)).into_response()
    }
}
