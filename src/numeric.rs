//! # Numeric Coercion Utilities
//!
//! Pure, total numeric primitives used throughout the pipeline. Model output
//! and OCR text are loosely typed; every number that reaches a calculation
//! passes through these functions first, so downstream code never sees NaN,
//! infinities, or strings pretending to be numbers.

use serde_json::Value;

/// Round a float to the nearest integer, treating non-finite input as 0.
pub fn round_finite(x: f64) -> i64 {
    if x.is_finite() {
        x.round() as i64
    } else {
        0
    }
}

/// Coerce a loosely-typed JSON value into an integer.
///
/// Accepts numbers and numeric strings (trimmed). Anything else, including
/// a missing value or a non-finite number, yields `default`.
pub fn safe_int(value: Option<&Value>, default: i64) -> i64 {
    let Some(value) = value else {
        return default;
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => n.round() as i64,
        _ => default,
    }
}

/// Constrain `n` into `[min, max]`.
pub fn clamp(n: i64, min: i64, max: i64) -> i64 {
    n.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_finite() {
        assert_eq!(round_finite(2.4), 2);
        assert_eq!(round_finite(2.5), 3);
        assert_eq!(round_finite(-1.5), -2);
        assert_eq!(round_finite(f64::NAN), 0);
        assert_eq!(round_finite(f64::INFINITY), 0);
    }

    #[test]
    fn test_safe_int_numbers() {
        assert_eq!(safe_int(Some(&json!(42)), 0), 42);
        assert_eq!(safe_int(Some(&json!(42.6)), 0), 43);
        assert_eq!(safe_int(Some(&json!(-3)), 0), -3);
    }

    #[test]
    fn test_safe_int_strings() {
        assert_eq!(safe_int(Some(&json!("120")), 0), 120);
        assert_eq!(safe_int(Some(&json!("  95.4 ")), 0), 95);
        assert_eq!(safe_int(Some(&json!("not a number")), 7), 7);
    }

    #[test]
    fn test_safe_int_defaults() {
        assert_eq!(safe_int(None, 100), 100);
        assert_eq!(safe_int(Some(&json!(null)), 5), 5);
        assert_eq!(safe_int(Some(&json!([1, 2])), 5), 5);
        assert_eq!(safe_int(Some(&json!({"a": 1})), 5), 5);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(50, 1, 2000), 50);
        assert_eq!(clamp(0, 1, 2000), 1);
        assert_eq!(clamp(9999, 1, 2000), 2000);
        assert_eq!(clamp(1, 1, 2000), 1);
        assert_eq!(clamp(2000, 1, 2000), 2000);
    }
}
