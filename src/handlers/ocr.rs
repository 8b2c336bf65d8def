use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use super::analyze::{run_analyze, AnalyzeResponse};
use crate::error::AnalyzeError;
use crate::ocr::MAX_IMAGE_BYTES;
use crate::state::AppState;

pub async fn analyze_image(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    if !state.ocr.is_configured() {
        return Err(AnalyzeError::OcrNotConfigured);
    }
    if !state.sessions.exists(&session_id) {
        return Err(AnalyzeError::SessionNotFound(session_id));
    }

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        if let Some(ct) = &content_type {
            if !ct.starts_with("image/") {
                return Err(AnalyzeError::InvalidUpload(format!(
                    "Expected an image, got {}",
                    ct
                )));
            }
        }
        let bytes = field.bytes().await.map_err(upload_error)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AnalyzeError::UploadTooLarge(MAX_IMAGE_BYTES));
        }
        image = Some((bytes.to_vec(), file_name, content_type));
        break;
    }

    let (bytes, file_name, content_type) =
        image.ok_or_else(|| AnalyzeError::InvalidUpload("Missing image field".to_string()))?;

    let text = state.ocr.extract(bytes, file_name, content_type).await?;
    run_analyze(&state, &session_id, text).await.map(Json)
}

fn upload_error(e: MultipartError) -> AnalyzeError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AnalyzeError::UploadTooLarge(MAX_IMAGE_BYTES);
    }
    warn!("[riskscan] Failed to read upload: {:?}", e);
    AnalyzeError::InvalidUpload(format!("Failed to read image: {}", e.body_text()))
}
