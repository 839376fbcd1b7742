//! End-to-end selection: fetch, parse, then mark candidates
//!
//! Any failure before the selector runs leaves every candidate untouched and
//! reports the full candidate count, so callers can treat "selection
//! unavailable" as "run everything".

use crate::cancel::Cancellation;
use crate::error::{AppError, AppResult, SelectionFailure};
use crate::metrics::Metrics;
use crate::selector::{self, CandidateTest, SelectionSummary};
use crate::source::StatisticsSource;
use crate::stats::{StatisticsTable, parse_statistics};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Fetch statistics for `suite`/`cloud` and apply selection to `tests`
///
/// On success returns the number of candidates that remain runnable; the
/// candidates chosen for skipping have had `skip` and `skip_details`
/// overwritten in place. On failure no candidate is modified and
/// `SelectionFailure::fallback_count` equals `tests.len()`.
pub async fn read_tests_to_run(
    source: &dyn StatisticsSource,
    cancel: &Cancellation,
    tests: &mut [CandidateTest],
    cloud: &str,
    suite: &str,
) -> Result<usize, SelectionFailure> {
    TestSelection::new(source)
        .run(cancel, tests, cloud, suite)
        .await
        .map(|summary| summary.runnable())
}

/// A configured selection run
pub struct TestSelection<'a> {
    source: &'a dyn StatisticsSource,
    metrics: Option<&'a Metrics>,
}

impl<'a> TestSelection<'a> {
    pub fn new(source: &'a dyn StatisticsSource) -> Self {
        Self {
            source,
            metrics: None,
        }
    }

    /// Record decisions, failures and fetch latency into `metrics`
    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Like [`read_tests_to_run`], returning the per-decision breakdown
    pub async fn run(
        &self,
        cancel: &Cancellation,
        tests: &mut [CandidateTest],
        cloud: &str,
        suite: &str,
    ) -> Result<SelectionSummary, SelectionFailure> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("test_selection", %run_id, %suite, %cloud);

        async {
            let table = match self.load(cancel, suite, cloud).await {
                Ok(table) => table,
                Err(source) => {
                    tracing::warn!(
                        error = %source,
                        kind = source.kind(),
                        candidates = tests.len(),
                        "Test selection unavailable, all candidates stay runnable"
                    );
                    if let Some(metrics) = self.metrics {
                        metrics.record_fetch_failure(source.kind());
                    }
                    return Err(SelectionFailure {
                        suite: suite.to_string(),
                        cloud: cloud.to_string(),
                        fallback_count: tests.len(),
                        source,
                    });
                }
            };

            let summary = selector::summarize(&table, tests, suite);
            if let Some(metrics) = self.metrics {
                metrics.record_summary(&summary);
            }

            tracing::info!(
                candidates = summary.total(),
                runnable = summary.runnable(),
                skipped = summary.skipped,
                "Test selection applied"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn load(
        &self,
        cancel: &Cancellation,
        suite: &str,
        cloud: &str,
    ) -> AppResult<StatisticsTable> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let started = Instant::now();
        let data = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            result = self.source.fetch(suite, cloud) => result?,
        };
        let table = parse_statistics(&data)?;

        if let Some(metrics) = self.metrics {
            metrics.observe_fetch_duration(started.elapsed().as_secs_f64() * 1000.0);
        }
        tracing::debug!(
            tests = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded statistics table"
        );
        Ok(table)
    }
}
