//! Image → text through an external OCR sidecar.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{error, info};

use crate::error::AnalyzeError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[ \t]*\r?\n\s*(\w)").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw OCR output. `None` when nothing readable is left.
pub fn clean_extracted_text(raw: &str) -> Option<String> {
    let joined = HYPHEN_BREAK.replace_all(raw, "$1$2");
    let printable: String = joined
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    let collapsed = WHITESPACE.replace_all(&printable, " ");
    let text = collapsed.trim();

    if text.chars().any(char::is_alphanumeric) {
        Some(text.to_string())
    } else {
        None
    }
}

/// The sidecar answers either `{"text": "..."}` or the bare text.
fn response_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(_) => body.to_string(),
    }
}

#[derive(Clone)]
pub struct OcrClient {
    url: Option<String>,
    client: reqwest::Client,
}

impl OcrClient {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub async fn extract(
        &self,
        image: Vec<u8>,
        file_name: String,
        content_type: Option<String>,
    ) -> Result<String, AnalyzeError> {
        let base = self.url.as_ref().ok_or(AnalyzeError::OcrNotConfigured)?;

        if image.is_empty() {
            return Err(AnalyzeError::InvalidUpload("Image is empty".to_string()));
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(AnalyzeError::UploadTooLarge(MAX_IMAGE_BYTES));
        }

        let mut part = reqwest::multipart::Part::bytes(image).file_name(file_name);
        if let Some(ct) = content_type {
            part = part
                .mime_str(&ct)
                .map_err(|_| AnalyzeError::InvalidUpload(format!("Invalid content type: {}", ct)))?;
        }
        let form = reqwest::multipart::Form::new().part("image", part);

        let url = format!("{}/ocr", base);
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("[riskscan] OCR request failed: {:?}", e);
                AnalyzeError::OcrUnavailable("OCR service is not responding".to_string())
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(AnalyzeError::OcrExtraction);
        }
        if !status.is_success() {
            error!("[riskscan] OCR service returned {}", status);
            return Err(AnalyzeError::OcrUnavailable(format!(
                "OCR service returned {}",
                status
            )));
        }

        let body = resp.text().await.map_err(|e| {
            error!("[riskscan] OCR response unreadable: {:?}", e);
            AnalyzeError::OcrUnavailable("OCR response unreadable".to_string())
        })?;

        let text = clean_extracted_text(&response_text(&body)).ok_or(AnalyzeError::OcrExtraction)?;
        info!("[riskscan] OCR extracted {} characters", text.chars().count());
        Ok(text)
    }
}
