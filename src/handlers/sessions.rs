use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analytics::AnalyticsSnapshot;
use crate::classify::ClassificationResult;
use crate::error::AnalyzeError;
use crate::state::AppState;
use crate::templates::summary;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_input: Option<String>,
    pub last_result: Option<ClassificationResult>,
    pub analytics: AnalyticsSnapshot,
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), AnalyzeError> {
    let session_id = state.sessions.create()?;
    info!("[riskscan] Session {} created", session_id);
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AnalyzeError> {
    let view = state.sessions.with_session(&session_id, |session| SessionView {
        session_id: session_id.clone(),
        created_at: session.created_at,
        last_input: session.last_input.clone(),
        last_result: session.last_result.clone(),
        analytics: session.analytics.snapshot(),
    })?;
    Ok(Json(view))
}

pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AnalyzeError> {
    state.sessions.clear(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AnalyzeError> {
    if !state.sessions.end(&session_id) {
        return Err(AnalyzeError::SessionNotFound(session_id));
    }
    info!("[riskscan] Session {} ended", session_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AnalyzeError> {
    let rendered = state.sessions.with_session(&session_id, |session| {
        match (&session.last_input, &session.last_result) {
            (Some(text), Some(result)) => Some(summary::render(text, result)),
            _ => None,
        }
    })?;
    let body = rendered.ok_or(AnalyzeError::NothingToSummarize)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"analysis.txt\"",
            ),
        ],
        body,
    )
        .into_response())
}
