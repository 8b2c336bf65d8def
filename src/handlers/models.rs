use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::ModelManifest;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelInfo {
    #[serde(flatten)]
    pub manifest: ModelManifest,
    pub vocabulary_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oov_index: Option<i64>,
    /// Keccak-256 of the ONNX file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_hash: Option<String>,
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    let analyzer = &state.analyzer;
    Json(ModelInfo {
        manifest: analyzer.manifest().clone(),
        vocabulary_size: analyzer.vocab().len(),
        oov_index: analyzer.vocab().oov_index(),
        model_hash: analyzer.fingerprint().map(str::to_string),
    })
}
