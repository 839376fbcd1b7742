//! Statistics read from a local directory

use super::{ObjectNaming, StatisticsSource};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads `{dir}/{object name}` instead of downloading it
///
/// Useful for offline runs against a previously downloaded snapshot.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    naming: ObjectNaming,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>, naming: ObjectNaming) -> Self {
        Self {
            dir: dir.into(),
            naming,
        }
    }
}

#[async_trait]
impl StatisticsSource for FileSource {
    async fn fetch(&self, suite: &str, cloud: &str) -> AppResult<Vec<u8>> {
        let object = self.naming.object_name(suite, cloud);
        let path = self.dir.join(&object);

        match tokio::fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(path = %path.display(), bytes = data.len(), "Read statistics file");
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::ObjectNotFound {
                bucket: self.dir.display().to_string(),
                object,
            }),
            Err(e) => Err(AppError::Read {
                object,
                source: Box::new(e),
            }),
        }
    }
}
