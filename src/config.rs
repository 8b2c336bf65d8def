use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub model_dir: PathBuf,
    pub cors_origins: Option<String>,
    pub ocr_url: Option<String>,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = parse_or("PORT", 3000);

        let model_dir = PathBuf::from(
            std::env::var("MODEL_DIR").unwrap_or_else(|_| "./model".to_string()),
        );

        if !model_dir.exists() {
            error!("[riskscan] Model directory not found: {:?}", model_dir);
            std::process::exit(1);
        }

        let cors_origins = std::env::var("CORS_ORIGINS").ok();

        let ocr_url = std::env::var("OCR_URL")
            .ok()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let session_ttl = Duration::from_secs(parse_or("SESSION_TTL_SECS", 3600));
        let max_sessions = parse_or("MAX_SESSIONS", 10_000);
        let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

        Self {
            port,
            model_dir,
            cors_origins,
            ocr_url,
            session_ttl,
            max_sessions,
            static_dir,
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join("network.onnx")
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.model_dir.join("vocab.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.model_dir.join("model.toml")
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("[riskscan] Invalid {} value, defaulting to {}", key, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            model_dir: PathBuf::from("./model"),
            cors_origins: None,
            ocr_url: None,
            session_ttl: Duration::from_secs(3600),
            max_sessions: 16,
            static_dir: None,
        }
    }
}
