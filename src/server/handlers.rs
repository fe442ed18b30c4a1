//! Request handlers for `/analyze` and `/healthcheck`.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use super::error::ApiError;
use super::AppState;
use crate::health;

/// Multipart field carrying the PDF.
pub const UPLOAD_FIELD: &str = "file";

/// `POST /analyze`: multipart PDF upload → model's JSON answer.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let multipart = multipart.map_err(|e| {
        debug!("Rejected non-multipart request: {}", e);
        ApiError::NoFile
    })?;
    let limit = state.analyzer.config().max_upload_bytes;
    let bytes = read_upload(multipart, limit).await?;
    info!("Received upload: {} bytes", bytes.len());

    let analyzer = &state.analyzer;
    let upload = analyzer.save_upload(&bytes).map_err(ApiError::Save)?;

    let text = analyzer.extract_text(upload.path()).await;
    upload.discard();
    let text = text.map_err(ApiError::Processing)?;

    let result = analyzer.infer(&text).await.map_err(ApiError::Inference)?;
    Ok(Json(result))
}

/// Pull the bytes of the `file` field out of the multipart body.
///
/// Other fields, and a `file` field sent without a filename, are skipped. An
/// absent or empty upload, or a body that cannot be parsed, counts as no
/// upload.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<Bytes, ApiError> {
    let map_err = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge { limit }
        } else {
            debug!("Malformed multipart body: {}", e);
            ApiError::NoFile
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(map_err)? {
        // Plain form values named `file` are not uploads.
        if field.name() != Some(UPLOAD_FIELD) || field.file_name().is_none() {
            continue;
        }
        let data = field.bytes().await.map_err(map_err)?;
        if data.is_empty() {
            return Err(ApiError::NoFile);
        }
        return Ok(data);
    }

    Err(ApiError::NoFile)
}

/// `GET /healthcheck`: versions of tesseract and poppler.
pub async fn healthcheck(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let versions = health::check_tools(state.analyzer.config())
        .await
        .map_err(ApiError::Dependency)?;
    Ok(Json(versions))
}
