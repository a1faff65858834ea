//! # Portion Heuristics for Prepared Foods
//!
//! A vision model asked to weigh a cooked dish from a photo regularly misses
//! by a wide margin. This module clamps its gram estimate into a plausible
//! range for the dish category, chosen by Korean keyword substring match
//! against the dish name. Category order matters: noodle/rice-bowl keywords
//! are checked before soup/stew keywords so that 국수 (noodles) lands in the
//! noodle range rather than matching 국 (soup).

use tracing::debug;

use crate::numeric::clamp;

/// Noodle, rice-bowl, and curry dishes: a single plate or bowl.
const NOODLE_KEYWORDS: &[&str] = &[
    "면", "국수", "라면", "우동", "파스타", "덮밥", "볶음밥", "비빔밥", "카레",
];
const NOODLE_RANGE: (i64, i64) = (350, 600);

/// Soups, stews, and hot pots: broth adds weight and variance.
const SOUP_KEYWORDS: &[&str] = &["찌개", "국", "탕", "전골"];
const SOUP_RANGE: (i64, i64) = (300, 700);

/// Everything else.
const DEFAULT_RANGE: (i64, i64) = (150, 900);

/// Clamp a raw gram estimate for a prepared dish into its category's
/// plausible range. Matching is case-insensitive substring search; the first
/// matching category wins.
pub fn clamp_portion_for_dish(dish: &str, grams: i64) -> i64 {
    let dish = dish.to_lowercase();

    let (category, (min, max)) = if NOODLE_KEYWORDS.iter().any(|k| dish.contains(k)) {
        ("noodle", NOODLE_RANGE)
    } else if SOUP_KEYWORDS.iter().any(|k| dish.contains(k)) {
        ("soup", SOUP_RANGE)
    } else {
        ("default", DEFAULT_RANGE)
    };

    let clamped = clamp(grams, min, max);
    if clamped != grams {
        debug!(
            dish = %dish,
            category,
            raw_grams = grams,
            clamped_grams = clamped,
            "Portion estimate clamped to category range"
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stew_lower_bound() {
        // 찌개 matches the soup/stew category; 250 g is below its floor
        assert_eq!(clamp_portion_for_dish("김치찌개", 250), 300);
    }

    #[test]
    fn test_soup_upper_bound() {
        assert_eq!(clamp_portion_for_dish("설렁탕", 1200), 700);
    }

    #[test]
    fn test_noodle_checked_before_soup() {
        // 국수 contains 국, but the noodle category must win
        assert_eq!(clamp_portion_for_dish("잔치국수", 200), 350);
        assert_eq!(clamp_portion_for_dish("잔치국수", 800), 600);
    }

    #[test]
    fn test_noodle_range() {
        assert_eq!(clamp_portion_for_dish("라면", 500), 500);
        assert_eq!(clamp_portion_for_dish("카레", 100), 350);
        assert_eq!(clamp_portion_for_dish("비빔밥", 900), 600);
    }

    #[test]
    fn test_default_range() {
        assert_eq!(clamp_portion_for_dish("삼겹살", 1500), 900);
        assert_eq!(clamp_portion_for_dish("샐러드", 50), 150);
        assert_eq!(clamp_portion_for_dish("삼겹살", 400), 400);
    }

    #[test]
    fn test_in_range_unchanged() {
        assert_eq!(clamp_portion_for_dish("김치찌개", 450), 450);
    }
}
