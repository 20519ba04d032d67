//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Suggestion generation (model calls, parsed suggestions, tokens)
//! - Library resolution and playlist publishing
//! - Generation runs

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Suggestion Generation
// =============================================================================

/// Generator calls total by result.
pub static GENERATOR_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tuneforge_generator_calls_total",
            "Total suggestion generator calls",
        ),
        &["result"], // "ok", "empty", "error"
    )
    .unwrap()
});

/// Suggestions parsed out of model output.
pub static SUGGESTIONS_PARSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tuneforge_suggestions_total",
        "Total track suggestions parsed from model output",
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tuneforge_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Library Backends
// =============================================================================

/// Tracks resolved total by backend.
pub static TRACKS_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tuneforge_tracks_resolved_total",
            "Total suggestions resolved to a library track",
        ),
        &["backend"],
    )
    .unwrap()
});

/// Playlists published total by backend and status.
pub static PLAYLISTS_PUBLISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tuneforge_playlists_published_total",
            "Total playlist publish attempts",
        ),
        &["backend", "status"], // status: "success", "failed", "no_tracks"
    )
    .unwrap()
});

/// Library backend request duration.
pub static LIBRARY_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tuneforge_library_request_duration_seconds",
            "Duration of library backend calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["backend", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Generation Runs
// =============================================================================

/// Generation runs total by outcome.
pub static GENERATION_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tuneforge_generation_runs_total", "Total generation runs"),
        &["outcome"], // "done", "exhausted"
    )
    .unwrap()
});

/// Generator calls needed per run.
pub static GENERATOR_CALLS_PER_RUN: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "tuneforge_generator_calls_per_run",
            "Number of generator calls per generation run",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Generation
        Box::new(GENERATOR_CALLS.clone()),
        Box::new(SUGGESTIONS_PARSED.clone()),
        Box::new(LLM_TOKENS.clone()),
        // Libraries
        Box::new(TRACKS_RESOLVED.clone()),
        Box::new(PLAYLISTS_PUBLISHED.clone()),
        Box::new(LIBRARY_REQUEST_DURATION.clone()),
        // Runs
        Box::new(GENERATION_RUNS.clone()),
        Box::new(GENERATOR_CALLS_PER_RUN.clone()),
    ]
}
