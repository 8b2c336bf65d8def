use std::sync::Arc;

use crate::config::Config;
use crate::ocr::OcrClient;
use crate::pipeline::Analyzer;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: Arc<Analyzer>,
    pub sessions: SessionStore,
    pub ocr: OcrClient,
}

impl AppState {
    pub fn new(config: Config, analyzer: Analyzer) -> Self {
        let sessions = SessionStore::new(config.max_sessions);
        let ocr = OcrClient::new(config.ocr_url.clone());
        Self {
            config,
            analyzer: Arc::new(analyzer),
            sessions,
            ocr,
        }
    }
}
