//! # Recognition Data Model & Schema Coercion
//!
//! Defines the transient records the pipeline passes between stages and the
//! coercion that turns arbitrary, possibly-partial model output into the one
//! canonical shape all calculation consumes. Coercion never fails: every
//! absent or malformed field resolves to a documented default.
//!
//! All entities are created fresh per image-analysis request and discarded
//! after the response; nothing here persists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::numeric::{clamp, safe_int};

/// Upper clamp for a panel's net weight in grams
pub const MAX_NET_WEIGHT_G: i64 = 3000;
/// Upper clamp for a single serving size in grams
pub const MAX_SERVING_SIZE_G: i64 = 2000;
/// Upper clamp for servings per container
pub const MAX_SERVINGS_PER_CONTAINER: i64 = 60;
/// Upper clamp for printed calories per serving
pub const MAX_CALORIES_PER_SERVING: i64 = 2000;
/// Upper clamp for per-100g calories
pub const MAX_PER_100G_CALORIES: i64 = 900;
/// Portion weight bounds in grams
pub const MIN_PORTION_GRAMS: i64 = 1;
pub const MAX_PORTION_GRAMS: i64 = 2000;
/// Upper clamp for a final calorie estimate
pub const MAX_ESTIMATE_CALORIES: i64 = 2500;

/// Dish name used when recognition produced nothing usable
pub const UNKNOWN_DISH: &str = "unknown";

/// Whether the photographed food carries a printed nutrition label.
///
/// The classifier returns exactly one of two strings; anything else decodes
/// to `Prepared`, the branch that needs no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodContext {
    Packaged,
    Prepared,
}

impl FoodContext {
    /// Decode a loosely-typed context value, defaulting to `Prepared`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str).map(str::trim) {
            Some("packaged") => FoodContext::Packaged,
            _ => FoodContext::Prepared,
        }
    }

    /// Context-appropriate default portion unit: 개 (piece) for packaged
    /// foods, 인분 (serving) for cooked dishes.
    pub fn default_unit(self) -> &'static str {
        match self {
            FoodContext::Packaged => "개",
            FoodContext::Prepared => "인분",
        }
    }
}

impl Default for FoodContext {
    fn default() -> Self {
        FoodContext::Prepared
    }
}

/// Output of the classification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub dish: String,
    pub context: FoodContext,
}

impl RecognitionResult {
    /// Build from parsed classification output; a missing or malformed
    /// result defaults to an unknown prepared dish.
    pub fn from_parsed(value: Option<&Value>) -> Self {
        let dish = value
            .and_then(|v| v.get("dish"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_DISH)
            .to_string();
        let context = FoodContext::from_value(value.and_then(|v| v.get("context")));
        Self { dish, context }
    }
}

/// An estimated or derived serving size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionSpec {
    pub unit: String,
    pub count: i64,
    pub grams: i64,
}

/// Nutrition figures normalized to a 100-gram reference quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Per100g {
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

/// The structured values printed on a nutrition facts label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionPanel {
    pub net_weight_g: i64,
    pub serving_size_g: i64,
    pub servings_per_container: i64,
    pub calories_per_serving: i64,
    pub per100g: Per100g,
}

impl NutritionPanel {
    /// True when the panel carries any figure a calorie computation can use.
    pub fn has_calorie_data(&self) -> bool {
        self.calories_per_serving > 0 || self.per100g.calories > 0
    }
}

/// Portion weight and calories the model itself proposed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputBlock {
    pub portion_grams: i64,
    pub calories: i64,
}

/// The canonical shape all downstream calculation consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSchema {
    pub dish: String,
    pub context: FoodContext,
    pub portion: PortionSpec,
    pub panel: NutritionPanel,
    pub per100g: Per100g,
    pub output: OutputBlock,
}

/// The final externally-visible output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimate {
    pub dish: String,
    pub calories: i64,
}

impl CalorieEstimate {
    /// The documented "could not determine" result.
    pub fn unknown() -> Self {
        Self {
            dish: UNKNOWN_DISH.to_string(),
            calories: 0,
        }
    }
}

fn coerce_per100g(value: Option<&Value>) -> Per100g {
    Per100g {
        calories: clamp(
            safe_int(value.and_then(|v| v.get("calories")), 0),
            0,
            MAX_PER_100G_CALORIES,
        ),
        protein: clamp(safe_int(value.and_then(|v| v.get("protein")), 0), 0, 100),
        fat: clamp(safe_int(value.and_then(|v| v.get("fat")), 0), 0, 100),
        carbs: clamp(safe_int(value.and_then(|v| v.get("carbs")), 0), 0, 100),
    }
}

fn coerce_panel(value: Option<&Value>) -> NutritionPanel {
    NutritionPanel {
        net_weight_g: clamp(
            safe_int(value.and_then(|v| v.get("net_weight_g")), 0),
            0,
            MAX_NET_WEIGHT_G,
        ),
        serving_size_g: clamp(
            safe_int(value.and_then(|v| v.get("serving_size_g")), 0),
            0,
            MAX_SERVING_SIZE_G,
        ),
        servings_per_container: clamp(
            safe_int(value.and_then(|v| v.get("servings_per_container")), 0),
            0,
            MAX_SERVINGS_PER_CONTAINER,
        ),
        calories_per_serving: clamp(
            safe_int(value.and_then(|v| v.get("calories_per_serving")), 0),
            0,
            MAX_CALORIES_PER_SERVING,
        ),
        per100g: coerce_per100g(value.and_then(|v| v.get("per100g"))),
    }
}

impl NormalizedSchema {
    /// Coerce an arbitrary, possibly-partial recognition object into the
    /// canonical shape. This function never fails; absence of any field
    /// always resolves to its documented default.
    pub fn coerce(value: Option<&Value>) -> Self {
        let dish = value
            .and_then(|v| v.get("dish"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        let context = FoodContext::from_value(value.and_then(|v| v.get("context")));

        let portion_value = value.and_then(|v| v.get("portion"));
        let unit = portion_value
            .and_then(|p| p.get("unit"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| context.default_unit())
            .to_string();
        let count = safe_int(portion_value.and_then(|p| p.get("count")), 1).max(1);
        let grams = clamp(
            safe_int(portion_value.and_then(|p| p.get("grams")), 100),
            MIN_PORTION_GRAMS,
            MAX_PORTION_GRAMS,
        );
        let portion = PortionSpec { unit, count, grams };

        let panel = coerce_panel(value.and_then(|v| v.get("panel")));

        // per100g may appear as a sibling of panel or nested inside it
        let per100g = match value.and_then(|v| v.get("per100g")) {
            Some(top) => coerce_per100g(Some(top)),
            None => panel.per100g.clone(),
        };

        let output_value = value.and_then(|v| v.get("output"));
        let output = OutputBlock {
            portion_grams: clamp(
                safe_int(output_value.and_then(|o| o.get("portion_grams")), portion.grams),
                MIN_PORTION_GRAMS,
                MAX_PORTION_GRAMS,
            ),
            calories: clamp(
                safe_int(output_value.and_then(|o| o.get("calories")), 0),
                0,
                MAX_ESTIMATE_CALORIES,
            ),
        };

        Self {
            dish,
            context,
            portion,
            panel,
            per100g,
            output,
        }
    }

    /// Set the resolved portion weight on both the portion and output blocks.
    pub fn set_portion_grams(&mut self, grams: i64) {
        let grams = clamp(grams, MIN_PORTION_GRAMS, MAX_PORTION_GRAMS);
        self.portion.grams = grams;
        self.output.portion_grams = grams;
    }

    /// True when neither the panel nor the per-100g block can drive a
    /// calorie computation.
    pub fn lacks_calorie_data(&self) -> bool {
        self.panel.calories_per_serving == 0 && self.per100g.calories == 0
    }
}

/// Resolve the portion weight for a packaged food.
///
/// The raw parsed value is consulted (not the coerced schema, whose grams
/// default to 100) so a missing explicit figure correctly falls through.
/// First non-zero wins: explicit `portion.grams`, then serving size times
/// servings per container, then net weight, then 100.
pub fn resolve_packaged_grams(raw: Option<&Value>, panel: &NutritionPanel) -> i64 {
    let explicit = safe_int(
        raw.and_then(|v| v.get("portion")).and_then(|p| p.get("grams")),
        0,
    );
    let from_servings = if panel.serving_size_g > 0 && panel.servings_per_container > 0 {
        panel.serving_size_g * panel.servings_per_container
    } else {
        0
    };

    for grams in [explicit, from_servings, panel.net_weight_g, 100] {
        if grams > 0 {
            return clamp(grams, MIN_PORTION_GRAMS, MAX_PORTION_GRAMS);
        }
    }
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_decoding() {
        assert_eq!(
            FoodContext::from_value(Some(&json!("packaged"))),
            FoodContext::Packaged
        );
        assert_eq!(
            FoodContext::from_value(Some(&json!("prepared"))),
            FoodContext::Prepared
        );
        assert_eq!(
            FoodContext::from_value(Some(&json!("beverage"))),
            FoodContext::Prepared
        );
        assert_eq!(FoodContext::from_value(None), FoodContext::Prepared);
    }

    #[test]
    fn test_coerce_empty_object_uses_defaults() {
        let schema = NormalizedSchema::coerce(Some(&json!({})));
        assert_eq!(schema.dish, "");
        assert_eq!(schema.context, FoodContext::Prepared);
        assert_eq!(schema.portion.unit, "인분");
        assert_eq!(schema.portion.count, 1);
        assert_eq!(schema.portion.grams, 100);
        assert_eq!(schema.panel, NutritionPanel::default());
        assert_eq!(schema.output.calories, 0);
        assert_eq!(schema.output.portion_grams, 100);
    }

    #[test]
    fn test_coerce_none_never_fails() {
        let schema = NormalizedSchema::coerce(None);
        assert_eq!(schema.context, FoodContext::Prepared);
        assert_eq!(schema.portion.grams, 100);
    }

    #[test]
    fn test_coerce_packaged_unit_default() {
        let schema = NormalizedSchema::coerce(Some(&json!({"context": "packaged"})));
        assert_eq!(schema.portion.unit, "개");
    }

    #[test]
    fn test_coerce_clamps_panel_bounds() {
        let schema = NormalizedSchema::coerce(Some(&json!({
            "panel": {
                "net_weight_g": 99999,
                "serving_size_g": 5000,
                "servings_per_container": 500,
                "calories_per_serving": 12000,
                "per100g": {"calories": 4000}
            }
        })));
        assert_eq!(schema.panel.net_weight_g, MAX_NET_WEIGHT_G);
        assert_eq!(schema.panel.serving_size_g, MAX_SERVING_SIZE_G);
        assert_eq!(schema.panel.servings_per_container, MAX_SERVINGS_PER_CONTAINER);
        assert_eq!(schema.panel.calories_per_serving, MAX_CALORIES_PER_SERVING);
        assert_eq!(schema.panel.per100g.calories, MAX_PER_100G_CALORIES);
    }

    #[test]
    fn test_coerce_per100g_sibling_wins_over_panel() {
        let schema = NormalizedSchema::coerce(Some(&json!({
            "panel": {"per100g": {"calories": 300}},
            "per100g": {"calories": 150}
        })));
        assert_eq!(schema.per100g.calories, 150);
        assert_eq!(schema.panel.per100g.calories, 300);
    }

    #[test]
    fn test_coerce_per100g_falls_back_to_panel() {
        let schema = NormalizedSchema::coerce(Some(&json!({
            "panel": {"per100g": {"calories": 300}}
        })));
        assert_eq!(schema.per100g.calories, 300);
    }

    #[test]
    fn test_coerce_numeric_strings() {
        let schema = NormalizedSchema::coerce(Some(&json!({
            "portion": {"grams": "250", "count": "2"}
        })));
        assert_eq!(schema.portion.grams, 250);
        assert_eq!(schema.portion.count, 2);
    }

    #[test]
    fn test_resolve_packaged_grams_order() {
        let panel = NutritionPanel {
            net_weight_g: 500,
            serving_size_g: 50,
            servings_per_container: 4,
            ..Default::default()
        };

        // explicit portion grams win
        let raw = json!({"portion": {"grams": 150}});
        assert_eq!(resolve_packaged_grams(Some(&raw), &panel), 150);

        // no explicit grams: serving x servings
        let raw = json!({"portion": {}});
        assert_eq!(resolve_packaged_grams(Some(&raw), &panel), 200);

        // no serving info: net weight
        let panel = NutritionPanel {
            net_weight_g: 500,
            ..Default::default()
        };
        assert_eq!(resolve_packaged_grams(None, &panel), 500);

        // nothing at all: 100
        assert_eq!(resolve_packaged_grams(None, &NutritionPanel::default()), 100);
    }

    #[test]
    fn test_resolve_packaged_grams_clamped() {
        let panel = NutritionPanel {
            serving_size_g: 2000,
            servings_per_container: 60,
            ..Default::default()
        };
        assert_eq!(resolve_packaged_grams(None, &panel), MAX_PORTION_GRAMS);
    }

    #[test]
    fn test_recognition_result_defaults() {
        let result = RecognitionResult::from_parsed(None);
        assert_eq!(result.dish, UNKNOWN_DISH);
        assert_eq!(result.context, FoodContext::Prepared);

        let result =
            RecognitionResult::from_parsed(Some(&json!({"dish": "김밥", "context": "packaged"})));
        assert_eq!(result.dish, "김밥");
        assert_eq!(result.context, FoodContext::Packaged);
    }
}
