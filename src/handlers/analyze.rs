use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::ClassificationResult;
use crate::content::{SupportLine, DISCLAIMER, SUPPORT_LINES};
use crate::error::AnalyzeError;
use crate::pipeline::{analyze_blocking, validate};
use crate::state::AppState;

/// Transport cap on the JSON request body. Text length itself is unbounded.
pub const MAX_ANALYZE_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Clone)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub text: String,
    pub result: ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<&'static [SupportLine]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<&'static str>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    run_analyze(&state, &session_id, request.text).await.map(Json)
}

/// Validate, classify and record one text for a session.
pub async fn run_analyze(
    state: &AppState,
    session_id: &str,
    text: String,
) -> Result<AnalyzeResponse, AnalyzeError> {
    validate(&text)?;
    if !state.sessions.exists(session_id) {
        return Err(AnalyzeError::SessionNotFound(session_id.to_string()));
    }

    let result = analyze_blocking(state.analyzer.clone(), text.clone()).await?;
    state
        .sessions
        .record(session_id, text.clone(), result.clone())?;

    info!(
        "[riskscan] Session {} analyzed: {:?} p={:.3} ({:.1}ms)",
        session_id, result.label, result.probability, result.latency_ms
    );

    let high_risk = result.is_high_risk();
    Ok(AnalyzeResponse {
        session_id: session_id.to_string(),
        text,
        result,
        support: high_risk.then_some(SUPPORT_LINES),
        disclaimer: high_risk.then_some(DISCLAIMER),
    })
}
