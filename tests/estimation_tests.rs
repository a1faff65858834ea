use nutrilens::calorie::{calories_from_per100g, compute_calories};
use nutrilens::numeric::{clamp, round_finite, safe_int};
use nutrilens::portion::clamp_portion_for_dish;
use nutrilens::schema::{NormalizedSchema, MAX_ESTIMATE_CALORIES, UNKNOWN_DISH};
use nutrilens::text_normalizer::{normalize_model_text, parse_model_json};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_identity_inside_bounds() {
        for n in [1, 100, 999, 2000] {
            assert_eq!(clamp(n, 1, 2000), n);
        }
        assert_eq!(clamp(0, 1, 2000), 1);
        assert_eq!(clamp(5000, 1, 2000), 2000);
    }

    #[test]
    fn test_round_finite_never_panics_on_special_values() {
        assert_eq!(round_finite(f64::NAN), 0);
        assert_eq!(round_finite(f64::INFINITY), 0);
        assert_eq!(round_finite(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_safe_int_total_over_all_json_shapes() {
        for value in [
            json!(null),
            json!(true),
            json!([1]),
            json!({"n": 1}),
            json!("twelve"),
        ] {
            assert_eq!(safe_int(Some(&value), 77), 77);
        }
        assert_eq!(safe_int(Some(&json!("33")), 77), 33);
        assert_eq!(safe_int(Some(&json!(33.4)), 77), 33);
    }

    #[test]
    fn test_compute_calories_always_in_estimate_range() {
        let extreme = NormalizedSchema::coerce(Some(&json!({
            "context": "packaged",
            "portion": {"grams": 2000},
            "panel": {"calories_per_serving": 2000, "serving_size_g": 1}
        })));
        let computed = compute_calories(&extreme);
        assert!(computed.calories >= 0);
        assert!(computed.calories <= MAX_ESTIMATE_CALORIES);

        let empty = NormalizedSchema::coerce(None);
        let computed = compute_calories(&empty);
        assert_eq!(computed.calories, 0);
        assert_eq!(computed.dish, UNKNOWN_DISH);
    }

    #[test]
    fn test_packaged_per_serving_scaling() {
        // 200 kcal per 50 g serving, eaten portion 150 g
        let schema = NormalizedSchema::coerce(Some(&json!({
            "dish": "에너지바",
            "context": "packaged",
            "portion": {"grams": 150},
            "panel": {"calories_per_serving": 200, "serving_size_g": 50}
        })));
        assert_eq!(compute_calories(&schema).calories, 600);
    }

    #[test]
    fn test_per100g_scaling_matches_helper() {
        let schema = NormalizedSchema::coerce(Some(&json!({
            "dish": "감자튀김",
            "context": "prepared",
            "portion": {"grams": 180},
            "per100g": {"calories": 310}
        })));
        assert_eq!(
            compute_calories(&schema).calories,
            calories_from_per100g(310, 180)
        );
        assert_eq!(compute_calories(&schema).calories, 558);
    }

    #[test]
    fn test_normalizer_idempotent() {
        let samples = [
            "```json\n{\"dish\": \"김밥\"}\n```",
            "noise before {\"calories\": 120} noise after",
            "{\"already\": \"clean\"}",
            "no json here",
        ];
        for raw in samples {
            let once = normalize_model_text(raw);
            assert_eq!(normalize_model_text(&once), once);
        }
    }

    #[test]
    fn test_parse_model_json_never_panics() {
        for raw in ["", "{", "}{", "```", "[]", "null", "{\"ok\": 1}"] {
            let _ = parse_model_json(raw);
        }
        assert!(parse_model_json("{\"ok\": 1}").is_some());
    }

    #[test]
    fn test_stew_portion_clamped_into_category_range() {
        assert_eq!(clamp_portion_for_dish("김치찌개", 250), 300);
        assert_eq!(clamp_portion_for_dish("김치찌개", 2000), 700);
        // noodle keyword inside a soup-like name picks the noodle range
        assert_eq!(clamp_portion_for_dish("잔치국수", 250), 350);
    }

    #[test]
    fn test_portion_clamp_is_idempotent() {
        for dish in ["김치찌개", "라면", "삼겹살"] {
            for grams in [0, 250, 500, 5000] {
                let once = clamp_portion_for_dish(dish, grams);
                assert_eq!(clamp_portion_for_dish(dish, once), once);
            }
        }
    }
}
