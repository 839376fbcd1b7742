//! Where statistics payloads come from
//!
//! The selection pipeline only needs raw bytes for a (suite, cloud) pair.
//! `GcsSource` downloads them from a bucket; `FileSource` reads a local
//! directory laid out with the same object names.

pub mod credentials;
pub mod file;
pub mod gcs;

pub use credentials::Credentials;
pub use file::FileSource;
pub use gcs::GcsSource;

use crate::config::StorageConfig;
use crate::error::AppResult;
use async_trait::async_trait;

/// Fetches the raw statistics payload for a suite and cloud
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Return the full object contents
    ///
    /// Implementations perform a single attempt; there is no retry.
    async fn fetch(&self, suite: &str, cloud: &str) -> AppResult<Vec<u8>>;
}

/// Fixed parts of a statistics object name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNaming {
    prefix: String,
    extension: String,
}

impl ObjectNaming {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// `{prefix}-{suite}-{cloud}.{extension}`
    pub fn object_name(&self, suite: &str, cloud: &str) -> String {
        format!("{}-{}-{}.{}", self.prefix, suite, cloud, self.extension)
    }
}

impl From<&StorageConfig> for ObjectNaming {
    fn from(storage: &StorageConfig) -> Self {
        Self::new(storage.object_prefix(), storage.extension())
    }
}
