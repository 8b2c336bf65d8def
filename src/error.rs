use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Please enter some text before analyzing")]
    EmptyInput,

    #[error("Model is not available: {0}")]
    ModelUnavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("No readable text found in the image")]
    OcrExtraction,

    #[error("OCR is not configured")]
    OcrNotConfigured,

    #[error("OCR service unavailable: {0}")]
    OcrUnavailable(String),

    #[error("{0}")]
    InvalidUpload(String),

    #[error("Image exceeds {0} byte limit")]
    UploadTooLarge(usize),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Too many active sessions")]
    SessionLimit,

    #[error("Sample not found: {0}")]
    SampleNotFound(usize),

    #[error("Nothing analyzed yet in this session")]
    NothingToSummarize,
}

impl AnalyzeError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::EmptyInput | AnalyzeError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AnalyzeError::OcrExtraction => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyzeError::OcrNotConfigured => StatusCode::NOT_IMPLEMENTED,
            AnalyzeError::OcrUnavailable(_) => StatusCode::BAD_GATEWAY,
            AnalyzeError::SessionNotFound(_)
            | AnalyzeError::SampleNotFound(_)
            | AnalyzeError::NothingToSummarize => StatusCode::NOT_FOUND,
            AnalyzeError::ModelUnavailable(_) | AnalyzeError::SessionLimit => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AnalyzeError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            AnalyzeError::EmptyInput => {
                Some("Provide {\"text\": \"...\"} with at least one non-space character".to_string())
            }
            AnalyzeError::OcrExtraction => {
                Some("Try a sharper image or paste the text instead".to_string())
            }
            AnalyzeError::OcrNotConfigured => {
                Some("Set OCR_URL to enable image uploads".to_string())
            }
            AnalyzeError::InvalidUpload(_) => {
                Some("Upload the image as multipart form field 'image'".to_string())
            }
            AnalyzeError::SessionNotFound(_) => {
                Some("Create a session with POST /sessions".to_string())
            }
            AnalyzeError::SampleNotFound(_) => Some("Check GET /samples".to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
                hint: self.hint(),
            }),
        )
            .into_response()
    }
}
