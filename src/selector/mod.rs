//! Selection-based skipping of stable tests
//!
//! Each candidate is classified into exactly one [`Decision`] using the
//! following precedence:
//!
//! 1. opted out for the active suite → runs
//! 2. no historical record → runs
//! 3. already skipped by another mechanism → untouched, not counted
//! 4. record says not selected → skipped with [`SKIP_MARKER`]
//! 5. otherwise → runs

mod candidate;

pub use candidate::{CandidateTest, OptOutSuites};

use crate::stats::StatisticsTable;

/// Value written to `CandidateTest::skip` for tests skipped by selection
pub const SKIP_MARKER: &str = "test selector";

/// Value written to `CandidateTest::skip_details` alongside [`SKIP_MARKER`]
pub const SKIP_DETAILS: &str = "test skipped because it is stable and selective-tests is set.";

/// Outcome of evaluating one candidate against the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The test opts out of selection for the active suite
    OptedOut,
    /// The statistics have no record of the test
    NoHistory,
    /// Some other mechanism already skipped the test
    AlreadySkipped,
    /// Historically stable and not selected: skip it
    Skip,
    /// Historically selected: run it
    Run,
}

impl Decision {
    /// All decisions, in precedence order
    pub const ALL: [Decision; 5] = [
        Decision::OptedOut,
        Decision::NoHistory,
        Decision::AlreadySkipped,
        Decision::Skip,
        Decision::Run,
    ];

    /// Whether a candidate with this decision counts toward the runnable total
    ///
    /// `AlreadySkipped` is excluded: it was decided elsewhere.
    pub fn is_runnable(&self) -> bool {
        matches!(self, Self::OptedOut | Self::NoHistory | Self::Run)
    }

    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OptedOut => "opted_out",
            Self::NoHistory => "no_history",
            Self::AlreadySkipped => "already_skipped",
            Self::Skip => "skip",
            Self::Run => "run",
        }
    }
}

/// Classify a single candidate without modifying it
pub fn classify(table: &StatisticsTable, test: &CandidateTest, suite: &str) -> Decision {
    if test.opt_out_suites.contains(suite) {
        return Decision::OptedOut;
    }
    let Some(record) = table.get(&test.name) else {
        return Decision::NoHistory;
    };
    if test.is_skipped() {
        return Decision::AlreadySkipped;
    }
    if record.selected {
        Decision::Run
    } else {
        Decision::Skip
    }
}

/// Per-decision tallies of one selection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub opted_out: usize,
    pub no_history: usize,
    pub already_skipped: usize,
    pub skipped: usize,
    pub run: usize,
}

impl SelectionSummary {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::OptedOut => self.opted_out += 1,
            Decision::NoHistory => self.no_history += 1,
            Decision::AlreadySkipped => self.already_skipped += 1,
            Decision::Skip => self.skipped += 1,
            Decision::Run => self.run += 1,
        }
    }

    /// Number of candidates with the given decision
    pub fn count(&self, decision: Decision) -> usize {
        match decision {
            Decision::OptedOut => self.opted_out,
            Decision::NoHistory => self.no_history,
            Decision::AlreadySkipped => self.already_skipped,
            Decision::Skip => self.skipped,
            Decision::Run => self.run,
        }
    }

    /// Candidates that remain runnable after selection
    pub fn runnable(&self) -> usize {
        self.opted_out + self.no_history + self.run
    }

    /// Total candidates evaluated
    pub fn total(&self) -> usize {
        self.runnable() + self.already_skipped + self.skipped
    }
}

/// Apply selection to `tests` in place and return the runnable count
///
/// Only candidates classified as [`Decision::Skip`] are modified: their
/// `skip` and `skip_details` fields are overwritten. Every other candidate,
/// including its existing skip state, is left as the caller supplied it.
pub fn select_tests(table: &StatisticsTable, tests: &mut [CandidateTest], suite: &str) -> usize {
    summarize(table, tests, suite).runnable()
}

/// Same as [`select_tests`], returning the full per-decision breakdown
pub fn summarize(
    table: &StatisticsTable,
    tests: &mut [CandidateTest],
    suite: &str,
) -> SelectionSummary {
    let mut summary = SelectionSummary::default();

    for test in tests.iter_mut() {
        let decision = classify(table, test, suite);
        if decision == Decision::Skip {
            test.skip = SKIP_MARKER.to_string();
            test.skip_details = SKIP_DETAILS.to_string();
        }
        tracing::trace!(
            test = %test.name,
            decision = decision.as_str(),
            opt_out_configured = test.opt_out_suites.is_configured(),
            "Classified candidate"
        );
        summary.record(decision);
    }

    tracing::debug!(
        suite = %suite,
        total = summary.total(),
        runnable = summary.runnable(),
        skipped = summary.skipped,
        already_skipped = summary.already_skipped,
        opted_out = summary.opted_out,
        no_history = summary.no_history,
        "Selection pass complete"
    );

    summary
}
