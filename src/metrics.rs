//! Prometheus metrics collection for test-selector
//!
//! This module provides metrics instrumentation for tracking:
//! - Per-candidate selection decisions
//! - Statistics fetch failures by error kind
//! - Statistics fetch latency
//!
//! `gather()` renders the registry in Prometheus text format; the binary
//! writes it to `--metrics-file` for a node exporter textfile collector.

use crate::selector::{Decision, SelectionSummary};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector for test-selector
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    decisions_total: IntCounterVec,
    fetch_failures: IntCounterVec,
    fetch_duration: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: bounded by the five Decision variants
        let decisions_total = IntCounterVec::new(
            Opts::new(
                "test_selector_decisions_total",
                "Candidate tests by selection decision",
            ),
            &["decision"],
        )?;

        // Labels come from AppError::kind(), a fixed set
        let fetch_failures = IntCounterVec::new(
            Opts::new(
                "test_selector_fetch_failures_total",
                "Selection runs aborted before any candidate was modified, by error kind",
            ),
            &["kind"],
        )?;

        let fetch_duration = Histogram::with_opts(
            HistogramOpts::new(
                "test_selector_fetch_duration_ms",
                "Statistics download and parse latency in milliseconds",
            )
            .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0, 30000.0]),
        )?;

        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(fetch_failures.clone()))?;
        registry.register(Box::new(fetch_duration.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            decisions_total,
            fetch_failures,
            fetch_duration,
        })
    }

    /// Add every tally of a selection pass to the decision counters
    pub fn record_summary(&self, summary: &SelectionSummary) {
        for decision in Decision::ALL {
            self.decisions_total
                .with_label_values(&[decision.as_str()])
                .inc_by(summary.count(decision) as u64);
        }
    }

    pub fn record_fetch_failure(&self, kind: &str) {
        self.fetch_failures.with_label_values(&[kind]).inc();
    }

    pub fn observe_fetch_duration(&self, millis: f64) {
        self.fetch_duration.observe(millis);
    }

    /// Current value of the decision counter for `decision`
    pub fn decisions_count(&self, decision: Decision) -> u64 {
        self.decisions_total
            .with_label_values(&[decision.as_str()])
            .get()
    }

    /// Total fetch failures across all kinds
    pub fn fetch_failures_count(&self) -> u64 {
        let metric_families = self.registry.gather();
        metric_families
            .iter()
            .find(|mf| mf.name() == "test_selector_fetch_failures_total")
            .map(|mf| {
                mf.get_metric()
                    .iter()
                    .map(|m| m.counter.value.unwrap_or(0.0) as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Render all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
