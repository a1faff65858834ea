//! # Nutrition Database Client
//!
//! HTTP client for the nutrition-database search endpoint plus the candidate
//! selection rule. The endpoint answers a dish-name query with an ordered
//! candidate list; selection prefers a case-insensitive substring match in
//! either direction and falls back to the first candidate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult};

/// One candidate row from the nutrition database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionCandidate {
    pub name: String,
    #[serde(rename = "caloriesPer100g")]
    pub calories_per_100g: i64,
}

/// Seam for the nutrition-database collaborator.
#[async_trait]
pub trait NutritionDb: Send + Sync {
    /// Search the database by dish name; candidates arrive best-first.
    async fn search(&self, query: &str) -> AppResult<Vec<NutritionCandidate>>;
}

/// Pick the candidate for a dish from an ordered result list.
///
/// First candidate whose name contains the dish (or vice versa),
/// case-insensitively; if none match, the first candidate stands in.
pub fn select_candidate<'a>(
    candidates: &'a [NutritionCandidate],
    dish: &str,
) -> Option<&'a NutritionCandidate> {
    let dish = dish.trim().to_lowercase();
    if dish.is_empty() {
        return candidates.first();
    }
    candidates
        .iter()
        .find(|c| {
            let name = c.name.to_lowercase();
            name.contains(&dish) || dish.contains(&name)
        })
        .or_else(|| candidates.first())
}

/// reqwest-backed nutrition-database client.
pub struct NutritionDbClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl NutritionDbClient {
    pub fn new(client: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            url: config.endpoints.nutrition_search_url.clone(),
            timeout: Duration::from_secs(config.http.timeout_secs),
        }
    }
}

#[async_trait]
impl NutritionDb for NutritionDbClient {
    async fn search(&self, query: &str) -> AppResult<Vec<NutritionCandidate>> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "nutrition search returned {}: {}",
                status, error_text
            )));
        }

        let candidates: Vec<NutritionCandidate> = response.json().await?;
        debug!(query, count = candidates.len(), "Nutrition search returned candidates");
        Ok(candidates)
    }
}
