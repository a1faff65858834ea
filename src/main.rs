use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use nutrilens::config::PipelineConfig;
use nutrilens::pipeline::CaloriePipeline;
use nutrilens::vision::ImagePayload;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validate environment-driven configuration at startup
fn load_and_validate_config() -> Result<PipelineConfig> {
    let config = PipelineConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Configuration loading failed: {}", e))?;

    config.validate().map_err(|e| {
        anyhow::anyhow!(
            "Configuration validation failed: {}. Please check your environment variables.",
            e
        )
    })?;

    info!("Configuration validated successfully");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_and_validate_config()?;
    info!("{}", config.summary());

    let image_path = env::args()
        .nth(1)
        .context("usage: nutrilens <image-path>")?;

    let bytes = std::fs::read(&image_path)
        .with_context(|| format!("Failed to read image file: {}", image_path))?;
    let payload = ImagePayload::new(
        general_purpose::STANDARD.encode(&bytes),
        ImagePayload::guess_mime(&image_path),
    );
    info!(
        path = %image_path,
        bytes = bytes.len(),
        mime = %payload.mime_type,
        "Analyzing food image"
    );

    let pipeline = CaloriePipeline::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Pipeline initialization failed: {}", e))?;
    let estimate = pipeline.analyze(&payload).await;

    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
