//! Google Cloud Storage download via the JSON API

use super::{Credentials, ObjectNaming, StatisticsSource};
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Downloads statistics objects from a GCS bucket
pub struct GcsSource {
    http: reqwest::Client,
    storage: StorageConfig,
    naming: ObjectNaming,
    credentials: Credentials,
}

impl GcsSource {
    /// Create a source for the configured bucket
    ///
    /// # Errors
    ///
    /// Returns `AppError::Connection` if the HTTP client cannot be built.
    pub fn new(storage: StorageConfig, credentials: Credentials) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(storage.request_timeout_seconds()))
            .build()
            .map_err(|e| AppError::Connection {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        tracing::debug!(
            bucket = %storage.bucket(),
            endpoint = %storage.endpoint(),
            credentials = credentials.kind(),
            "Created object storage source"
        );

        Ok(Self {
            http,
            naming: ObjectNaming::from(&storage),
            storage,
            credentials,
        })
    }

    /// Download URL for an object: `{endpoint}/storage/v1/b/{bucket}/o/{object}?alt=media`
    ///
    /// The object name is percent-encoded as a single path segment.
    pub fn object_url(&self, object: &str) -> AppResult<Url> {
        let mut url = Url::parse(self.storage.endpoint()).map_err(|e| {
            AppError::Config(format!(
                "invalid storage endpoint '{}': {}",
                self.storage.endpoint(),
                e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!(
                    "storage endpoint '{}' cannot be a base URL",
                    self.storage.endpoint()
                ))
            })?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.storage.bucket(), "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");

        Ok(url)
    }
}

#[async_trait]
impl StatisticsSource for GcsSource {
    async fn fetch(&self, suite: &str, cloud: &str) -> AppResult<Vec<u8>> {
        let bucket = self.storage.bucket();
        let object = self.naming.object_name(suite, cloud);
        let url = self.object_url(&object)?;

        let token = self
            .credentials
            .access_token(&self.http, self.storage.metadata_endpoint())
            .await?;

        let mut request = self.http.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(project) = self.storage.quota_project() {
            request = request.header("x-goog-user-project", project);
        }

        tracing::debug!(bucket = %bucket, object = %object, "Downloading statistics object");

        let response = request.send().await.map_err(|e| AppError::Connection {
            reason: format!("request for {} in bucket {} failed: {}", object, bucket, e),
        })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(AppError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    object,
                });
            }
            status => {
                return Err(AppError::Fetch {
                    bucket: bucket.to_string(),
                    object,
                    status: status.as_u16(),
                });
            }
        }

        let body = response.bytes().await.map_err(|e| AppError::Read {
            object: object.clone(),
            source: Box::new(e),
        })?;

        tracing::info!(
            bucket = %bucket,
            object = %object,
            bytes = body.len(),
            "Downloaded statistics object"
        );
        Ok(body.to_vec())
    }
}
