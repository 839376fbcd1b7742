//! test-selector - skip stable tests based on historical selection statistics
//!
//! Statistics are downloaded per (suite, cloud) pair, parsed into a
//! [`stats::StatisticsTable`], and applied to a caller-owned list of
//! [`selector::CandidateTest`] in place. Entry point:
//! [`selection::read_tests_to_run`].

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod selection;
pub mod selector;
pub mod source;
pub mod stats;
pub mod telemetry;

pub use selection::read_tests_to_run;
