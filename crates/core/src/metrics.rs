//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search (outcomes, provider requests, decisions)
//! - Parsing (failures by reason)
//! - Tracked downloads (match outcomes, reconciliation)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches total by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("quarry_searches_total", "Total searches by outcome"),
        &["kind", "outcome"], // outcome: "completed", "no_providers", "all_failed", "cancelled", "invalid"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("quarry_search_duration_seconds", "Duration of searches")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["kind"],
    )
    .unwrap()
});

/// Provider requests total.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quarry_provider_requests_total",
            "Total provider fetch requests",
        ),
        &["provider", "status"], // status: "success", "error", "timeout"
    )
    .unwrap()
});

/// Provider request duration.
pub static PROVIDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "quarry_provider_duration_seconds",
            "Duration of provider fetch requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["provider"],
    )
    .unwrap()
});

/// Releases returned per search, before dedup.
pub static RELEASES_FETCHED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "quarry_releases_fetched",
            "Number of releases returned per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        &[],
    )
    .unwrap()
});

/// Decisions by result.
pub static DECISIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("quarry_decisions_total", "Total release decisions"),
        &["result"], // "accepted", "rejected"
    )
    .unwrap()
});

/// Rejections by specification.
pub static REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quarry_rejections_total",
            "Total rejections raised by each specification",
        ),
        &["specification"],
    )
    .unwrap()
});

/// Duplicate releases dropped during dedup.
pub static DUPLICATES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "quarry_duplicates_dropped_total",
        "Total duplicate releases dropped by guid",
    )
    .unwrap()
});

// =============================================================================
// Parser Metrics
// =============================================================================

/// Titles that produced no usable parse.
pub static PARSE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("quarry_parse_failures_total", "Total unparseable release titles"),
        &["source", "reason"], // source: "search", "tracking"
    )
    .unwrap()
});

// =============================================================================
// Tracking Metrics
// =============================================================================

/// Tracked download match outcomes by the step that matched.
pub static TRACKED_MATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quarry_tracked_matches_total",
            "Total tracked download match attempts",
        ),
        &["method"], // "history", "history_special", "client_special", "client_title", "unmatched"
    )
    .unwrap()
});

/// Tracked downloads orphaned by library deletions.
pub static TRACKED_ORPHANED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "quarry_tracked_orphaned_total",
        "Total tracked downloads unmatched by library deletions",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_DURATION.clone()),
        Box::new(RELEASES_FETCHED.clone()),
        Box::new(DECISIONS_TOTAL.clone()),
        Box::new(REJECTIONS_TOTAL.clone()),
        Box::new(DUPLICATES_DROPPED.clone()),
        // Parser
        Box::new(PARSE_FAILURES.clone()),
        // Tracking
        Box::new(TRACKED_MATCHES.clone()),
        Box::new(TRACKED_ORPHANED.clone()),
    ]
}

/// Register every core metric with `registry`.
pub fn register_metrics(registry: &Registry) -> prometheus::Result<()> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();

        SEARCHES_TOTAL
            .with_label_values(&["movie", "completed"])
            .inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "quarry_searches_total"));
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        assert!(register_metrics(&registry).is_err());
    }
}
