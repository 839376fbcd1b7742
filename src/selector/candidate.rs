//! Candidate tests handed in by the caller

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Suites for which a test refuses selection-based skipping
///
/// `NotConfigured` and an empty `Configured` set behave the same today;
/// they are kept apart so the two can diverge without a format change.
/// Serialized as `null` (not configured) or a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<BTreeSet<String>>", into = "Option<BTreeSet<String>>")]
pub enum OptOutSuites {
    #[default]
    NotConfigured,
    Configured(BTreeSet<String>),
}

impl OptOutSuites {
    /// A configured set containing the given suites
    pub fn configured<I, S>(suites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Configured(suites.into_iter().map(Into::into).collect())
    }

    /// A configured set that opts out of nothing
    pub fn empty() -> Self {
        Self::Configured(BTreeSet::new())
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// True only when configured and the suite is listed
    pub fn contains(&self, suite: &str) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Configured(suites) => suites.contains(suite),
        }
    }
}

impl From<Option<BTreeSet<String>>> for OptOutSuites {
    fn from(value: Option<BTreeSet<String>>) -> Self {
        match value {
            None => Self::NotConfigured,
            Some(suites) => Self::Configured(suites),
        }
    }
}

impl From<OptOutSuites> for Option<BTreeSet<String>> {
    fn from(value: OptOutSuites) -> Self {
        match value {
            OptOutSuites::NotConfigured => None,
            OptOutSuites::Configured(suites) => Some(suites),
        }
    }
}

/// A test the caller wants evaluated
///
/// Selection writes only `skip` and `skip_details`, and only on candidates
/// it decides to skip. A non-empty `skip` on input means another mechanism
/// has already skipped the test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTest {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skip_details: String,
    #[serde(default)]
    pub opt_out_suites: OptOutSuites,
}

impl CandidateTest {
    /// A runnable candidate with no opt-outs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Mark as already skipped by some other mechanism
    pub fn with_skip(mut self, skip: impl Into<String>, details: impl Into<String>) -> Self {
        self.skip = skip.into();
        self.skip_details = details.into();
        self
    }

    pub fn with_opt_out(mut self, suites: OptOutSuites) -> Self {
        self.opt_out_suites = suites;
        self
    }

    pub fn is_skipped(&self) -> bool {
        !self.skip.is_empty()
    }
}
