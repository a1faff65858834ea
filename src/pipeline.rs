//! # Calorie-Estimation Pipeline Orchestrator
//!
//! Sequences one image-analysis request through classification, the
//! packaged or prepared analysis branch, the OCR-assisted retry, and the
//! nutrition-database fallback, resolving to a single best-effort
//! `CalorieEstimate`.
//!
//! Every failure is recovered where it happens: a dead endpoint, a timeout,
//! or unparsable model output all degrade to documented defaults and the
//! request continues down the fallback chain. The pipeline never propagates
//! an error to its caller; `calories: 0` is the "could not determine"
//! signal.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::calorie::{calories_from_per100g, compute_calories};
use crate::config::PipelineConfig;
use crate::errors::AppResult;
use crate::label_extractor::extract_panel;
use crate::nutrition_db::{select_candidate, NutritionDb, NutritionDbClient};
use crate::observability;
use crate::ocr_client::{OcrApi, OcrClient};
use crate::portion::clamp_portion_for_dish;
use crate::schema::{
    resolve_packaged_grams, CalorieEstimate, FoodContext, NormalizedSchema, RecognitionResult,
    UNKNOWN_DISH,
};
use crate::text_normalizer::parse_model_json;
use crate::vision::{AnalyzeAction, ImagePayload, VisionApi, VisionClient};

/// The orchestrator. Stateless between requests; concurrent analyses are
/// independent.
pub struct CaloriePipeline {
    vision: Arc<dyn VisionApi>,
    ocr: Arc<dyn OcrApi>,
    nutrition: Arc<dyn NutritionDb>,
}

impl CaloriePipeline {
    /// Assemble a pipeline over explicit collaborators (tests use this with
    /// scripted fakes).
    pub fn new(
        vision: Arc<dyn VisionApi>,
        ocr: Arc<dyn OcrApi>,
        nutrition: Arc<dyn NutritionDb>,
    ) -> Self {
        Self {
            vision,
            ocr,
            nutrition,
        }
    }

    /// Assemble a pipeline with reqwest-backed clients sharing one HTTP
    /// client, configured from the validated config.
    pub fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        config.validate()?;
        let client = reqwest::Client::new();
        Ok(Self::new(
            Arc::new(VisionClient::new(client.clone(), config)),
            Arc::new(OcrClient::new(client.clone(), config)),
            Arc::new(NutritionDbClient::new(client, config)),
        ))
    }

    /// Analyze one food image end to end. Always resolves to a structurally
    /// valid estimate; never fails.
    pub async fn analyze(&self, image: &ImagePayload) -> CalorieEstimate {
        let start = Instant::now();

        let recognition = self.classify(image).await;
        let estimate = match recognition.context {
            FoodContext::Packaged => {
                observability::record_classification("packaged");
                self.analyze_packaged(image, None).await
            }
            FoodContext::Prepared => {
                observability::record_classification("prepared");
                let prepared = self.analyze_prepared(image).await;
                if prepared.calories > 0 {
                    prepared
                } else {
                    // prepared analysis found nothing; the item may carry a
                    // label after all, so retry as packaged with the dish
                    // name as a hint
                    observability::record_fallback("prepared_to_packaged");
                    let hint = (prepared.dish != UNKNOWN_DISH && !prepared.dish.is_empty())
                        .then_some(prepared.dish.as_str());
                    self.analyze_packaged(image, hint).await
                }
            }
        };

        observability::record_pipeline_result(start.elapsed(), estimate.calories > 0);
        info!(
            dish = %estimate.dish,
            calories = estimate.calories,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline resolved estimate"
        );
        estimate
    }

    /// Classification stage. Parse failure or a dead endpoint defaults to
    /// an unknown prepared dish.
    async fn classify(&self, image: &ImagePayload) -> RecognitionResult {
        let parsed = match self
            .vision
            .analyze(image, AnalyzeAction::Classify, None)
            .await
        {
            Ok(text) => parse_model_json(&text),
            Err(e) => {
                warn!(error = %e, "Classification call failed, defaulting to prepared");
                observability::record_recovered_failure("classify");
                None
            }
        };
        RecognitionResult::from_parsed(parsed.as_ref())
    }

    /// Packaged-food branch: model analysis, OCR-assisted retry when the
    /// panel is empty, grams resolution, calorie computation, database
    /// fallback.
    async fn analyze_packaged(
        &self,
        image: &ImagePayload,
        dish_hint: Option<&str>,
    ) -> CalorieEstimate {
        let mut raw = self.run_analysis(image, AnalyzeAction::Packaged, None).await;
        let mut schema = NormalizedSchema::coerce(raw.as_ref());
        schema.context = FoodContext::Packaged;

        if schema.dish.is_empty() {
            if let Some(hint) = dish_hint {
                schema.dish = hint.to_string();
            }
        }

        if schema.lacks_calorie_data() {
            observability::record_fallback("ocr");
            self.ocr_assisted_retry(image, &mut raw, &mut schema).await;
        }

        let grams = resolve_packaged_grams(raw.as_ref(), &schema.panel);
        schema.set_portion_grams(grams);

        let computed = compute_calories(&schema);
        if computed.calories > 0 {
            observability::record_branch_result("packaged", true);
            return CalorieEstimate {
                dish: computed.dish,
                calories: computed.calories,
            };
        }

        if let Some(estimate) = self.lookup_database(&schema.dish, grams).await {
            observability::record_branch_result("packaged", true);
            return estimate;
        }

        observability::record_branch_result("packaged", false);
        CalorieEstimate {
            dish: computed.dish,
            calories: 0,
        }
    }

    /// Prepared-food branch: model analysis, portion clamping, database
    /// lookup first (a real-world average beats a model guess), model
    /// per-100g estimate last.
    async fn analyze_prepared(&self, image: &ImagePayload) -> CalorieEstimate {
        let raw = self.run_analysis(image, AnalyzeAction::Prepared, None).await;
        let mut schema = NormalizedSchema::coerce(raw.as_ref());
        schema.context = FoodContext::Prepared;

        let grams = clamp_portion_for_dish(&schema.dish, schema.output.portion_grams);
        schema.set_portion_grams(grams);

        if let Some(estimate) = self.lookup_database(&schema.dish, grams).await {
            observability::record_branch_result("prepared", true);
            return estimate;
        }

        let computed = compute_calories(&schema);
        observability::record_branch_result("prepared", computed.calories > 0);
        CalorieEstimate {
            dish: computed.dish,
            calories: computed.calories,
        }
    }

    /// One vision analysis call, recovered to `None` on any failure.
    async fn run_analysis(
        &self,
        image: &ImagePayload,
        action: AnalyzeAction,
        prompt: Option<&str>,
    ) -> Option<Value> {
        match self.vision.analyze(image, action, prompt).await {
            Ok(text) => {
                let parsed = parse_model_json(&text);
                if parsed.is_none() {
                    debug!(action = action.endpoint(), "Analysis output had no JSON object");
                }
                parsed
            }
            Err(e) => {
                warn!(error = %e, action = action.endpoint(), "Analysis call failed");
                observability::record_recovered_failure(action.endpoint());
                None
            }
        }
    }

    /// OCR-assisted retry for a packaged food whose first analysis carried
    /// no calorie data.
    ///
    /// The OCR text goes back to the vision endpoint as a prompt first; if
    /// the re-analysis still lacks calorie data, the local label extractor
    /// runs over the same text as the net under the model.
    async fn ocr_assisted_retry(
        &self,
        image: &ImagePayload,
        raw: &mut Option<Value>,
        schema: &mut NormalizedSchema,
    ) {
        let ocr_text = match self.ocr.extract_text(image).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "OCR call failed, keeping model result");
                observability::record_recovered_failure("ocr");
                return;
            }
        };
        if ocr_text.trim().is_empty() {
            debug!("OCR returned no text");
            return;
        }

        let prompt = format!(
            "텍스트 분석 결과를 활용하여 JSON을 다시 생성해줘: {}",
            ocr_text
        );
        if let Some(reparsed) = self
            .run_analysis(image, AnalyzeAction::Packaged, Some(&prompt))
            .await
        {
            let mut recoerced = NormalizedSchema::coerce(Some(&reparsed));
            recoerced.context = FoodContext::Packaged;
            if recoerced.dish.is_empty() {
                recoerced.dish = schema.dish.clone();
            }
            if !recoerced.lacks_calorie_data() {
                debug!("OCR-assisted re-analysis produced calorie data");
                *raw = Some(reparsed);
                *schema = recoerced;
                return;
            }
        }

        // the model could not use the OCR text; extract the panel locally
        let panel = extract_panel(&ocr_text);
        if panel != Default::default() {
            debug!("Adopting locally extracted nutrition panel");
            if panel.per100g.calories > 0 {
                schema.per100g = panel.per100g.clone();
            }
            schema.panel = panel;
        }
    }

    /// Nutrition-database fallback tier. Yields an estimate only when the
    /// lookup succeeds and scales to a positive calorie figure.
    async fn lookup_database(&self, dish: &str, grams: i64) -> Option<CalorieEstimate> {
        let dish = dish.trim();
        if dish.is_empty() {
            return None;
        }

        observability::record_fallback("database");
        let candidates = match self.nutrition.search(dish).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, dish, "Nutrition search failed");
                observability::record_recovered_failure("database");
                return None;
            }
        };

        let candidate = select_candidate(&candidates, dish)?;
        let calories = calories_from_per100g(candidate.calories_per_100g, grams);
        if calories > 0 {
            debug!(
                dish,
                matched = %candidate.name,
                calories_per_100g = candidate.calories_per_100g,
                grams,
                calories,
                "Nutrition database produced estimate"
            );
            Some(CalorieEstimate {
                dish: dish.to_string(),
                calories,
            })
        } else {
            None
        }
    }
}
