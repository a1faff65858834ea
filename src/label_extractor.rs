//! # Nutrition-Label Text Extractor
//!
//! Regex-driven extraction of nutrition-panel fields from raw OCR text.
//! Labels on Korean retail packaging mix Korean and English vocabulary
//! (내용량 / net weight, 1회 제공량 / serving size, 열량 / kcal), so every
//! field is matched by an ordered list of rules covering both.
//!
//! Rule ordering is significant and must be preserved: explicitly labeled
//! patterns are tried before generic lookahead fallbacks, and the first rule
//! that matches a field wins. Each rule pairs a compiled pattern with an
//! extractor function, so adding a label variant is a one-entry change.
//!
//! Matching runs over lower-cased, whitespace-collapsed text; OCR line
//! breaks inside a label phrase collapse to single spaces first.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::numeric::{clamp, round_finite};
use crate::schema::{
    NutritionPanel, Per100g, MAX_CALORIES_PER_SERVING, MAX_NET_WEIGHT_G, MAX_PER_100G_CALORIES,
    MAX_SERVINGS_PER_CONTAINER, MAX_SERVING_SIZE_G,
};

/// A single extraction rule: a pattern plus the function that pulls a number
/// out of its captures.
struct FieldRule {
    name: &'static str,
    pattern: Regex,
    extract: fn(&Captures) -> Option<f64>,
}

impl FieldRule {
    fn new(name: &'static str, pattern: &str, extract: fn(&Captures) -> Option<f64>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("label extraction pattern should be valid"),
            extract,
        }
    }
}

// A number as OCR renders it: "500", "1,250", "2.5"
const NUM: &str = r"(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)";

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', "").parse::<f64>().ok()
}

fn first_group(caps: &Captures) -> Option<f64> {
    caps.get(1).and_then(|m| parse_number(m.as_str()))
}

lazy_static! {
    // <grams> g × <count>
    static ref MUL_G_FIRST: Regex =
        Regex::new(&format!(r"{NUM}\s*g\s*[x×*]\s*(\d+)")).expect("pattern should be valid");
    // <count> 개/봉/팩 × <grams> g
    static ref MUL_COUNT_FIRST: Regex =
        Regex::new(&format!(r"(\d+)\s*(?:개|봉|팩)\s*[x×*]\s*{NUM}\s*g"))
            .expect("pattern should be valid");

    static ref NET_WEIGHT_RULES: Vec<FieldRule> = vec![FieldRule::new(
        "labeled_net_weight",
        &format!(r"(?:총\s*내용량|내용량|순중량|net\s*weight)[^0-9]{{0,12}}{NUM}\s*g"),
        first_group,
    )];

    static ref SERVING_SIZE_RULES: Vec<FieldRule> = vec![
        FieldRule::new(
            "labeled_serving_size",
            &format!(r"(?:1\s*회\s*제공량|serving\s*size)[^0-9]{{0,12}}{NUM}\s*g"),
            first_group,
        ),
        // a gram figure with a calorie keyword in a short lookahead window;
        // the window may contain the kcal digits themselves ("45g 228kcal")
        FieldRule::new(
            "grams_before_calorie_keyword",
            &format!(r"{NUM}\s*g.{{0,12}}(?:kcal|칼로리|열량|에너지|calories?)"),
            first_group,
        ),
    ];

    static ref SERVINGS_RULES: Vec<FieldRule> = vec![
        FieldRule::new("korean_total_servings", r"총\s*(\d+)\s*회", first_group),
        FieldRule::new("english_servings", r"(\d+)\s*servings?", first_group),
    ];

    static ref CALORIES_PER_SERVING_RULES: Vec<FieldRule> = vec![
        FieldRule::new(
            "per_serving_kcal",
            &format!(r"(?:1\s*회\s*제공량|per\s*serving)[^0-9]{{0,15}}{NUM}\s*kcal"),
            first_group,
        ),
        FieldRule::new(
            "generic_energy_kcal",
            &format!(r"(?:열량|칼로리|에너지|energy|calories?)[^0-9]{{0,15}}{NUM}\s*kcal"),
            first_group,
        ),
    ];

    static ref PER_100G_RULES: Vec<FieldRule> = vec![FieldRule::new(
        "per_100g_kcal",
        &format!(r"100\s*g[^0-9]{{0,20}}{NUM}\s*kcal"),
        first_group,
    )];
}

/// Lower-case and collapse all whitespace runs to single spaces.
fn preprocess(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Evaluate a rule list in order; the first rule that matches wins.
fn apply_rules(rules: &[FieldRule], text: &str) -> Option<i64> {
    for rule in rules {
        if let Some(caps) = rule.pattern.captures(text) {
            if let Some(value) = (rule.extract)(&caps) {
                trace!(rule = rule.name, value, "Label field rule matched");
                return Some(round_finite(value));
            }
        }
    }
    None
}

/// Detect multiplicative quantity patterns (`500g × 4`, `4개 × 500g`) and
/// return the total gram figure.
fn detect_multiplied_quantity(text: &str) -> Option<i64> {
    if let Some(caps) = MUL_G_FIRST.captures(text) {
        let grams = caps.get(1).and_then(|m| parse_number(m.as_str()))?;
        let count = caps.get(2).and_then(|m| parse_number(m.as_str()))?;
        if grams > 0.0 && count > 0.0 {
            return Some(round_finite(grams * count));
        }
    }
    if let Some(caps) = MUL_COUNT_FIRST.captures(text) {
        let count = caps.get(1).and_then(|m| parse_number(m.as_str()))?;
        let grams = caps.get(2).and_then(|m| parse_number(m.as_str()))?;
        if grams > 0.0 && count > 0.0 {
            return Some(round_finite(grams * count));
        }
    }
    None
}

/// Extract a nutrition panel from raw OCR text.
///
/// Every field passes through the same clamping bounds as the coerced
/// schema. Fields that no rule matches are 0, except servings-per-container,
/// which is derived as `round(net_weight / serving_size)` (minimum 1) when
/// both figures are known.
pub fn extract_panel(text: &str) -> NutritionPanel {
    let text = preprocess(text);
    if text.is_empty() {
        return NutritionPanel::default();
    }

    let multiplied = detect_multiplied_quantity(&text);

    let net_weight_g = clamp(
        apply_rules(&NET_WEIGHT_RULES, &text)
            .or(multiplied)
            .unwrap_or(0),
        0,
        MAX_NET_WEIGHT_G,
    );

    let serving_size_g = clamp(
        apply_rules(&SERVING_SIZE_RULES, &text).unwrap_or(0),
        0,
        MAX_SERVING_SIZE_G,
    );

    let servings_per_container = clamp(
        apply_rules(&SERVINGS_RULES, &text).unwrap_or_else(|| {
            if net_weight_g > 0 && serving_size_g > 0 {
                round_finite(net_weight_g as f64 / serving_size_g as f64).max(1)
            } else {
                0
            }
        }),
        0,
        MAX_SERVINGS_PER_CONTAINER,
    );

    let calories_per_serving = clamp(
        apply_rules(&CALORIES_PER_SERVING_RULES, &text).unwrap_or(0),
        0,
        MAX_CALORIES_PER_SERVING,
    );

    let per_100g_calories = clamp(
        apply_rules(&PER_100G_RULES, &text).unwrap_or(0),
        0,
        MAX_PER_100G_CALORIES,
    );

    let panel = NutritionPanel {
        net_weight_g,
        serving_size_g,
        servings_per_container,
        calories_per_serving,
        per100g: Per100g {
            calories: per_100g_calories,
            ..Per100g::default()
        },
    };

    debug!(
        net_weight_g,
        serving_size_g,
        servings_per_container,
        calories_per_serving,
        per_100g_calories,
        "Extracted nutrition panel from OCR text"
    );

    panel
}
