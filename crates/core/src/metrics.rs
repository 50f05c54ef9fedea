//! Prometheus metrics for the generation pipeline.
//!
//! This module provides metrics for:
//! - Jobs (completions by outcome, queue depth pressure)
//! - Stages (durations, retries)
//! - Images (fetched, skipped)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs completed total by terminal state.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("slidecast_jobs_completed_total", "Total jobs completed"),
        &["state"], // "succeeded", "failed", "cancelled"
    )
    .unwrap()
});

/// Jobs submitted total.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("slidecast_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Whole-job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "slidecast_job_duration_seconds",
            "Duration of a job from start to terminal state",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["state"],
    )
    .unwrap()
});

// =============================================================================
// Stage Metrics
// =============================================================================

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "slidecast_stage_duration_seconds",
            "Duration of individual pipeline stages",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        &["stage"],
    )
    .unwrap()
});

/// Stage retry attempts total.
pub static STAGE_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("slidecast_stage_retries_total", "Total stage retry attempts"),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Image Metrics
// =============================================================================

/// Images fetched successfully.
pub static IMAGES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "slidecast_images_fetched_total",
        "Total images fetched into scratch",
    )
    .unwrap()
});

/// Images skipped after exhausting retries.
pub static IMAGES_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "slidecast_images_skipped_total",
        "Total images skipped as unusable",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(STAGE_RETRIES.clone()),
        Box::new(IMAGES_FETCHED.clone()),
        Box::new(IMAGES_SKIPPED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
