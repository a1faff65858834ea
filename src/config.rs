//! # Pipeline Configuration
//!
//! Centralized configuration for the calorie-estimation pipeline, loaded
//! from environment variables and validated before any network client is
//! built. The pipeline itself takes the config by reference; there is no
//! process-wide mutable configuration state.

use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{AppError, AppResult};

/// External collaborator endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Base URL of the vision analysis proxy; the action name
    /// (`classify`/`packaged`/`prepared`) is appended per request
    pub vision_base_url: String,
    /// URL of the OCR text-extraction endpoint
    pub ocr_url: String,
    /// URL of the nutrition-database search endpoint
    pub nutrition_search_url: String,
}

fn validate_url(url: &str, key: &str) -> AppResult<()> {
    if url.trim().is_empty() {
        return Err(AppError::Config(format!("{} cannot be empty", key)));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::Config(format!(
            "{} must start with 'http://' or 'https://'",
            key
        )));
    }
    Ok(())
}

impl EndpointsConfig {
    /// Validate endpoint configuration
    pub fn validate(&self) -> AppResult<()> {
        validate_url(&self.vision_base_url, "VISION_API_BASE_URL")?;
        validate_url(&self.ocr_url, "OCR_API_URL")?;
        validate_url(&self.nutrition_search_url, "NUTRITION_SEARCH_URL")?;
        Ok(())
    }
}

/// HTTP client settings shared by all outbound calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds; expiry surfaces as a local network
    /// failure and the orchestrator falls through to the next tier
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    /// Validate HTTP client configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::Config("HTTP timeout cannot be 0".to_string()));
        }
        if self.timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout cannot be greater than 300 seconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unified pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub endpoints: EndpointsConfig,
    pub http: HttpConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        config.endpoints.vision_base_url = env::var("VISION_API_BASE_URL").map_err(|_| {
            AppError::Config("VISION_API_BASE_URL environment variable is required".to_string())
        })?;
        config.endpoints.ocr_url = env::var("OCR_API_URL").map_err(|_| {
            AppError::Config("OCR_API_URL environment variable is required".to_string())
        })?;
        config.endpoints.nutrition_search_url =
            env::var("NUTRITION_SEARCH_URL").map_err(|_| {
                AppError::Config("NUTRITION_SEARCH_URL environment variable is required".to_string())
            })?;

        config.http.timeout_secs = env::var("HTTP_CLIENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| {
                AppError::Config("HTTP_CLIENT_TIMEOUT_SECS must be a valid number".to_string())
            })?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.endpoints.validate()?;
        self.http.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: vision_base_url={}, ocr_url={}, nutrition_search_url={}, http_timeout_secs={}",
            self.endpoints.vision_base_url,
            self.endpoints.ocr_url,
            self.endpoints.nutrition_search_url,
            self.http.timeout_secs
        )
    }
}
