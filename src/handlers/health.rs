use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_id: String,
    pub sessions_active: usize,
    pub ocr_enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: format!("riskscan-v{}", env!("CARGO_PKG_VERSION")),
        model_id: state.analyzer.manifest().id.clone(),
        sessions_active: state.sessions.len(),
        ocr_enabled: state.ocr.is_configured(),
    })
}
