//! # Calorie Calculator
//!
//! Turns a normalized recognition schema into a calorie figure. Per-serving
//! label data is authoritative when present (it matches the printed nutrition
//! facts exactly); per-100g is the generic proportional fallback. The result
//! is always an integer in `[0, MAX_ESTIMATE_CALORIES]`, with 0 meaning
//! "could not determine".

use tracing::debug;

use crate::numeric::{clamp, round_finite};
use crate::schema::{FoodContext, NormalizedSchema, MAX_ESTIMATE_CALORIES, UNKNOWN_DISH};

/// Result of a calorie computation over a normalized schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieComputation {
    pub dish: String,
    pub portion_grams: i64,
    pub calories: i64,
}

/// Compute the calorie estimate for a normalized schema.
pub fn compute_calories(schema: &NormalizedSchema) -> CalorieComputation {
    let grams = schema.output.portion_grams;

    let raw = match schema.context {
        FoodContext::Packaged => {
            if schema.panel.calories_per_serving > 0 && schema.panel.serving_size_g > 0 {
                round_finite(
                    schema.panel.calories_per_serving as f64
                        * (grams as f64 / schema.panel.serving_size_g as f64),
                )
            } else if schema.per100g.calories > 0 {
                round_finite(schema.per100g.calories as f64 * (grams as f64 / 100.0))
            } else {
                0
            }
        }
        FoodContext::Prepared => {
            if schema.per100g.calories > 0 {
                round_finite(schema.per100g.calories as f64 * (grams as f64 / 100.0))
            } else {
                0
            }
        }
    };

    let calories = clamp(raw, 0, MAX_ESTIMATE_CALORIES);
    let dish = if schema.dish.trim().is_empty() {
        UNKNOWN_DISH.to_string()
    } else {
        schema.dish.trim().to_string()
    };

    debug!(
        dish = %dish,
        context = ?schema.context,
        portion_grams = grams,
        calories,
        "Computed calorie estimate"
    );

    CalorieComputation {
        dish,
        portion_grams: grams,
        calories,
    }
}

/// Scale a per-100g calorie figure to a portion weight, clamped to the
/// estimate bounds. Used for nutrition-database candidates.
pub fn calories_from_per100g(calories_per_100g: i64, grams: i64) -> i64 {
    if calories_per_100g <= 0 || grams <= 0 {
        return 0;
    }
    clamp(
        round_finite(calories_per_100g as f64 * (grams as f64 / 100.0)),
        0,
        MAX_ESTIMATE_CALORIES,
    )
}
