//! # Pipeline Observability
//!
//! Advisory metrics for pipeline stages via the `metrics` facade. The
//! library records; wiring an exporter (Prometheus or otherwise) is the
//! embedding service's concern. Nothing here ever blocks or fails a
//! request.

use std::time::Duration;

/// Record the outcome of a classification stage.
pub fn record_classification(context: &'static str) {
    metrics::counter!("pipeline_classifications_total", "context" => context).increment(1);
}

/// Record one completed analysis branch and whether it produced calories.
pub fn record_branch_result(branch: &'static str, found_calories: bool) {
    metrics::counter!(
        "pipeline_branch_results_total",
        "branch" => branch,
        "result" => if found_calories { "calories" } else { "zero" }
    )
    .increment(1);
}

/// Record activation of a fallback tier (OCR retry, database lookup,
/// prepared-to-packaged retry).
pub fn record_fallback(tier: &'static str) {
    metrics::counter!("pipeline_fallbacks_total", "tier" => tier).increment(1);
}

/// Record a failure that was recovered locally (the request continued).
pub fn record_recovered_failure(stage: &'static str) {
    metrics::counter!("pipeline_recovered_failures_total", "stage" => stage).increment(1);
}

/// Record end-to-end pipeline duration and whether the estimate was nonzero.
pub fn record_pipeline_result(duration: Duration, found_calories: bool) {
    metrics::counter!(
        "pipeline_requests_total",
        "result" => if found_calories { "estimate" } else { "unknown" }
    )
    .increment(1);
    metrics::histogram!("pipeline_duration_seconds").record(duration.as_secs_f64());
}
