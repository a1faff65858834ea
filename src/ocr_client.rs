//! # OCR Client
//!
//! HTTP client for the external OCR endpoint. The endpoint takes a base64
//! image and answers with whatever free text it could read off the label;
//! an empty string is a valid answer for an unreadable image.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult};
use crate::vision::ImagePayload;

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    #[serde(rename = "imageData")]
    image_data: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
}

/// Seam for the OCR collaborator.
#[async_trait]
pub trait OcrApi: Send + Sync {
    /// Extract free text from an image.
    async fn extract_text(&self, image: &ImagePayload) -> AppResult<String>;
}

/// reqwest-backed OCR client.
pub struct OcrClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OcrClient {
    pub fn new(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            url: config.endpoints.ocr_url.clone(),
            timeout: Duration::from_secs(config.http.timeout_secs),
        }
    }
}

#[async_trait]
impl OcrApi for OcrClient {
    async fn extract_text(&self, image: &ImagePayload) -> AppResult<String> {
        let body = OcrRequest {
            image_data: &image.data,
            mime_type: &image.mime_type,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Ocr(format!(
                "OCR endpoint returned {}: {}",
                status, error_text
            )));
        }

        let text = response.text().await?;
        debug!(chars = text.len(), "OCR endpoint returned text");
        Ok(text)
    }
}
