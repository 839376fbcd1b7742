//! Historical per-test statistics
//!
//! A `StatisticsTable` is built once per selection run from the CSV
//! published by the upstream statistics job, and is read-only afterwards.

pub mod loader;

pub use loader::parse_statistics;

use std::collections::HashMap;

/// One row of the statistics table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalRecord {
    /// Whether the upstream selection process chose to keep running the test
    pub selected: bool,
    pub average_duration_millis: i64,
    pub total_runs: i64,
}

/// Lookup from test name to its historical record
///
/// Duplicate names collapse to the last record inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsTable {
    records: HashMap<String, HistoricalRecord>,
}

impl StatisticsTable {
    /// Get the record for a test, if the statistics mention it
    pub fn get(&self, name: &str) -> Option<&HistoricalRecord> {
        self.records.get(name)
    }

    /// Number of distinct tests in the table
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, HistoricalRecord)> for StatisticsTable {
    fn from_iter<I: IntoIterator<Item = (String, HistoricalRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
