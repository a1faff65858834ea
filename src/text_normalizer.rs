//! # Model-Output Text Normalizer
//!
//! Vision-model responses arrive as free text that usually, but not always,
//! contains a JSON object, often wrapped in Markdown code fences. This module
//! strips the decoration and recovers the object leniently: a response that
//! cannot be parsed yields `None`, never an error, and callers substitute
//! documented defaults.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

lazy_static! {
    // ```json ... ``` and bare ``` fences, with or without a language tag
    static ref CODE_FENCE: Regex =
        Regex::new(r"```[A-Za-z]*").expect("code fence pattern should be valid");
}

/// Normalize raw model output into a best-effort JSON object string.
///
/// Strips Markdown code-fence markers, trims whitespace, then isolates the
/// substring from the first `{` to the last `}` inclusive. If no brace pair
/// is found the trimmed text is returned unchanged. Normalizing already
/// normalized JSON text returns the same text.
pub fn normalize_model_text(raw: &str) -> String {
    let stripped = CODE_FENCE.replace_all(raw, "");
    let trimmed = stripped.trim();

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Normalize and parse model output, returning `None` when no structured
/// data is available.
pub fn parse_model_json(raw: &str) -> Option<Value> {
    let normalized = normalize_model_text(raw);
    match serde_json::from_str::<Value>(&normalized) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            debug!("Model output parsed but is not a JSON object");
            None
        }
        Err(e) => {
            debug!(error = %e, "Model output is not parsable JSON, falling back to defaults");
            None
        }
    }
}
