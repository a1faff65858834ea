//! # Vision Analysis Client
//!
//! HTTP client for the vision-model proxy. The proxy keeps the model API key
//! server-side and selects a prompt per action, so this client only ships
//! the image and the action name: `classify`, `packaged`, or `prepared`.
//! Responses are raw model text; the pipeline normalizes and parses them.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult};

/// Which analysis the vision endpoint should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeAction {
    Classify,
    Packaged,
    Prepared,
}

impl AnalyzeAction {
    /// Endpoint path segment for this action.
    pub fn endpoint(self) -> &'static str {
        match self {
            AnalyzeAction::Classify => "classify",
            AnalyzeAction::Packaged => "packaged",
            AnalyzeAction::Prepared => "prepared",
        }
    }
}

/// A captured image ready for the wire: base64 data plus its MIME type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Guess the MIME type from a file path's extension; jpeg when unsure.
    pub fn guess_mime(path: &str) -> &'static str {
        let path = path.to_lowercase();
        if path.ends_with(".png") {
            "image/png"
        } else if path.ends_with(".heic") || path.ends_with(".heif") {
            "image/heic"
        } else if path.ends_with(".webp") {
            "image/webp"
        } else if path.ends_with(".bmp") {
            "image/bmp"
        } else {
            "image/jpeg"
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    #[serde(rename = "imageData")]
    image_data: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
}

/// Seam for the vision analysis collaborator; tests substitute scripted
/// implementations.
#[async_trait]
pub trait VisionApi: Send + Sync {
    /// Run one analysis action over an image, optionally with an extra
    /// prompt (used by the OCR-assisted packaged retry). Returns the raw
    /// model response text.
    async fn analyze(
        &self,
        image: &ImagePayload,
        action: AnalyzeAction,
        prompt: Option<&str>,
    ) -> AppResult<String>;
}

/// reqwest-backed vision client.
pub struct VisionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl VisionClient {
    pub fn new(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            base_url: config
                .endpoints
                .vision_base_url
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(config.http.timeout_secs),
        }
    }
}

#[async_trait]
impl VisionApi for VisionClient {
    async fn analyze(
        &self,
        image: &ImagePayload,
        action: AnalyzeAction,
        prompt: Option<&str>,
    ) -> AppResult<String> {
        let url = format!("{}/{}", self.base_url, action.endpoint());
        let body = AnalyzeRequest {
            image_data: &image.data,
            mime_type: &image.mime_type,
            prompt,
        };

        debug!(
            action = action.endpoint(),
            with_prompt = prompt.is_some(),
            image_bytes = image.data.len(),
            "Calling vision analysis endpoint"
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "vision endpoint {} returned {}: {}",
                action.endpoint(),
                status,
                error_text
            )));
        }

        Ok(response.text().await?)
    }
}
