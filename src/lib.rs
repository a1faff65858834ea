//! # NutriLens
//!
//! Calorie-estimation pipeline for a food-logging application. Given a food
//! photo it sequences a vision-model classification, packaged/prepared
//! analysis, OCR-assisted nutrition-label extraction, and a
//! nutrition-database lookup into one best-effort `{dish, calories}`
//! estimate that is always returned, never an error.

pub mod calorie;
pub mod config;
pub mod errors;
pub mod label_extractor;
pub mod numeric;
pub mod nutrition_db;
pub mod observability;
pub mod ocr_client;
pub mod pipeline;
pub mod portion;
pub mod schema;
pub mod text_normalizer;
pub mod vision;

// Re-export types for easier access
pub use pipeline::CaloriePipeline;
pub use schema::{CalorieEstimate, FoodContext, NormalizedSchema, NutritionPanel};
pub use vision::ImagePayload;
