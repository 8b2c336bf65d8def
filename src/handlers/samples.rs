use axum::extract::{Path, State};
use axum::Json;

use super::analyze::{run_analyze, AnalyzeResponse};
use crate::content::{self, SampleText, SupportLine, SAMPLES, SUPPORT_LINES};
use crate::error::AnalyzeError;
use crate::state::AppState;

pub async fn list_samples() -> Json<&'static [SampleText]> {
    Json(SAMPLES)
}

pub async fn list_resources() -> Json<&'static [SupportLine]> {
    Json(SUPPORT_LINES)
}

pub async fn analyze_sample(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let sample = content::sample(index).ok_or(AnalyzeError::SampleNotFound(index))?;
    run_analyze(&state, &session_id, sample.text.to_string())
        .await
        .map(Json)
}
