//! Pipeline metrics and observability module.
//!
//! This module provides metrics tracking for turn processing, including
//! translation engine reuse, backend calls and failures, heuristic
//! short-circuits, and configuration downgrades.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global pipeline metrics singleton.
pub struct PipelineMetrics {
    /// Number of times a translation engine was already built for the requested pair
    engine_hits: AtomicUsize,

    /// Number of times a translation engine had to be built
    engine_misses: AtomicUsize,

    /// Number of calls made to the inference backend
    backend_calls: AtomicUsize,

    /// Number of backend calls that failed
    backend_failures: AtomicUsize,

    /// Number of turns answered by the rule table without touching the backend
    heuristic_hits: AtomicUsize,

    /// Number of times remote mode was downgraded to local for lack of a credential
    mode_downgrades: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

impl PipelineMetrics {
    const fn new() -> Self {
        Self {
            engine_hits: AtomicUsize::new(0),
            engine_misses: AtomicUsize::new(0),
            backend_calls: AtomicUsize::new(0),
            backend_failures: AtomicUsize::new(0),
            heuristic_hits: AtomicUsize::new(0),
            mode_downgrades: AtomicUsize::new(0),
        }
    }

    /// Get the global pipeline metrics instance.
    ///
    /// This method initializes the metrics on first call and returns a reference
    /// to the singleton instance on subsequent calls.
    pub fn global() -> &'static PipelineMetrics {
        METRICS.get_or_init(PipelineMetrics::new)
    }

    /// Record an engine hit (translation engine already cached for the pair).
    pub fn record_engine_hit(&self) {
        self.engine_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an engine miss (translation engine had to be built).
    pub fn record_engine_miss(&self) {
        self.engine_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call to the inference backend.
    pub fn record_backend_call(&self) {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a backend call failure.
    pub fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a turn answered by the rule table.
    pub fn record_heuristic_hit(&self) {
        self.heuristic_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a remote-to-local mode downgrade.
    pub fn record_mode_downgrade(&self) {
        self.mode_downgrades.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current engine hit count.
    pub fn engine_hits(&self) -> usize {
        self.engine_hits.load(Ordering::Relaxed)
    }

    /// Get the current engine miss count.
    pub fn engine_misses(&self) -> usize {
        self.engine_misses.load(Ordering::Relaxed)
    }

    /// Get the current backend call count.
    pub fn backend_calls(&self) -> usize {
        self.backend_calls.load(Ordering::Relaxed)
    }

    /// Get the current backend failure count.
    pub fn backend_failures(&self) -> usize {
        self.backend_failures.load(Ordering::Relaxed)
    }

    /// Get the current heuristic hit count.
    pub fn heuristic_hits(&self) -> usize {
        self.heuristic_hits.load(Ordering::Relaxed)
    }

    /// Get the current mode downgrade count.
    pub fn mode_downgrades(&self) -> usize {
        self.mode_downgrades.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.engine_hits();
        let misses = self.engine_misses();
        let total_engine_lookups = hits + misses;
        let engine_hit_rate = if total_engine_lookups > 0 {
            (hits as f64 / total_engine_lookups as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.backend_calls();
        let failures = self.backend_failures();
        let backend_success_rate = if calls > 0 {
            ((calls - failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            engine_hits: hits,
            engine_misses: misses,
            engine_hit_rate,
            backend_calls: calls,
            backend_failures: failures,
            backend_success_rate,
            heuristic_hits: self.heuristic_hits(),
            mode_downgrades: self.mode_downgrades(),
        }
    }
}

/// Metrics report containing current pipeline statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of engine cache hits
    pub engine_hits: usize,

    /// Number of engine cache misses
    pub engine_misses: usize,

    /// Engine cache hit rate as a percentage (0-100)
    pub engine_hit_rate: f64,

    /// Number of backend calls made
    pub backend_calls: usize,

    /// Number of backend failures
    pub backend_failures: usize,

    /// Backend success rate as a percentage (0-100)
    pub backend_success_rate: f64,

    /// Number of turns answered by the rule table
    pub heuristic_hits: usize,

    /// Number of remote-to-local mode downgrades
    pub mode_downgrades: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests use their own instance so counts are exact even when other
    // tests bump the global concurrently.

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_engine_hit() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.engine_hits(), 0);
        metrics.record_engine_hit();
        assert_eq!(metrics.engine_hits(), 1);
        metrics.record_engine_hit();
        assert_eq!(metrics.engine_hits(), 2);
    }

    #[test]
    fn test_record_engine_miss() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.engine_misses(), 0);
        metrics.record_engine_miss();
        assert_eq!(metrics.engine_misses(), 1);
    }

    #[test]
    fn test_record_backend_call() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.backend_calls(), 0);
        metrics.record_backend_call();
        assert_eq!(metrics.backend_calls(), 1);
    }

    #[test]
    fn test_record_backend_failure() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.backend_failures(), 0);
        metrics.record_backend_failure();
        assert_eq!(metrics.backend_failures(), 1);
    }

    #[test]
    fn test_record_heuristic_hit() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.heuristic_hits(), 0);
        metrics.record_heuristic_hit();
        assert_eq!(metrics.heuristic_hits(), 1);
    }

    #[test]
    fn test_record_mode_downgrade() {
        let metrics = PipelineMetrics::new();

        assert_eq!(metrics.mode_downgrades(), 0);
        metrics.record_mode_downgrade();
        assert_eq!(metrics.mode_downgrades(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let metrics = PipelineMetrics::new();
        let report = metrics.report();

        assert_eq!(report.engine_hits, 0);
        assert_eq!(report.engine_misses, 0);
        assert_eq!(report.engine_hit_rate, 0.0);
        assert_eq!(report.backend_calls, 0);
        assert_eq!(report.backend_failures, 0);
        assert_eq!(report.backend_success_rate, 0.0);
        assert_eq!(report.heuristic_hits, 0);
        assert_eq!(report.mode_downgrades, 0);
    }

    #[test]
    fn test_report_engine_hit_rate() {
        let metrics = PipelineMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_engine_hit();
        metrics.record_engine_hit();
        metrics.record_engine_hit();
        metrics.record_engine_miss();

        let report = metrics.report();
        assert_eq!(report.engine_hits, 3);
        assert_eq!(report.engine_misses, 1);
        assert_eq!(report.engine_hit_rate, 75.0);
    }

    #[test]
    fn test_report_backend_success_rate() {
        let metrics = PipelineMetrics::new();

        // 4 calls, 1 failure = 75% success rate
        metrics.record_backend_call();
        metrics.record_backend_call();
        metrics.record_backend_call();
        metrics.record_backend_call();
        metrics.record_backend_failure();

        let report = metrics.report();
        assert_eq!(report.backend_calls, 4);
        assert_eq!(report.backend_failures, 1);
        assert_eq!(report.backend_success_rate, 75.0);
    }

    #[test]
    fn test_report_100_percent_engine_hit_rate() {
        let metrics = PipelineMetrics::new();

        metrics.record_engine_hit();
        metrics.record_engine_hit();

        let report = metrics.report();
        assert_eq!(report.engine_hit_rate, 100.0);
    }

    #[test]
    fn test_report_all_backend_failures() {
        let metrics = PipelineMetrics::new();

        metrics.record_backend_call();
        metrics.record_backend_failure();
        metrics.record_backend_call();
        metrics.record_backend_failure();

        let report = metrics.report();
        assert_eq!(report.backend_success_rate, 0.0);
    }

    // ==================== Singleton Tests ====================

    #[test]
    fn test_global_returns_same_instance() {
        let metrics1 = PipelineMetrics::global();
        let metrics2 = PipelineMetrics::global();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(metrics1, metrics2));
    }
}
