//! Configuration management for test-selector
//!
//! Parses TOML configuration files and provides typed access to settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// How requests to the object store are authenticated when no credential
/// blob is supplied
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Ambient credentials from the metadata server
    #[default]
    Default,
    /// No Authorization header (emulators, public buckets)
    Anonymous,
}

/// Object storage configuration
///
/// Fields are private so validated values cannot be mutated after
/// `Config::validate()` has run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    bucket: String,
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_object_prefix")]
    object_prefix: String,
    #[serde(default = "default_extension")]
    extension: String,
    /// Project billed for the read (`x-goog-user-project`)
    #[serde(default)]
    quota_project: Option<String>,
    /// Name of the environment variable holding the credential JSON
    #[serde(default = "default_credentials_env")]
    credentials_env: String,
    #[serde(default)]
    auth: AuthMode,
    #[serde(default = "default_metadata_endpoint")]
    metadata_endpoint: String,
    #[serde(default = "default_request_timeout")]
    request_timeout_seconds: u64,
}

impl StorageConfig {
    /// Get the bucket holding the statistics objects
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the object storage API base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the fixed prefix of every statistics object name
    pub fn object_prefix(&self) -> &str {
        &self.object_prefix
    }

    /// Get the fixed extension of every statistics object name
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Get the quota project, if configured
    pub fn quota_project(&self) -> Option<&str> {
        self.quota_project.as_deref()
    }

    /// Get the name of the environment variable holding credentials
    pub fn credentials_env(&self) -> &str {
        &self.credentials_env
    }

    /// Get the fallback authentication mode
    pub fn auth(&self) -> AuthMode {
        self.auth
    }

    /// Get the metadata server base URL used for ambient credentials
    pub fn metadata_endpoint(&self) -> &str {
        &self.metadata_endpoint
    }

    /// Get the per-request timeout in seconds
    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
    }

    /// Point this configuration at a different API base URL
    ///
    /// Used when talking to an emulator or a test server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Point ambient credential lookups at a different metadata server
    pub fn with_metadata_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metadata_endpoint = endpoint.into();
        self
    }

    /// Use a different bucket
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Bill reads to the given project
    pub fn with_quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project = Some(project.into());
        self
    }

    /// Use a different fallback authentication mode
    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            endpoint: default_endpoint(),
            object_prefix: default_object_prefix(),
            extension: default_extension(),
            quota_project: None,
            credentials_env: default_credentials_env(),
            auth: AuthMode::default(),
            metadata_endpoint: default_metadata_endpoint(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_bucket() -> String {
    "test-selector-stats".to_string()
}

fn default_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_object_prefix() -> String {
    "tests".to_string()
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_credentials_env() -> String {
    "GOOGLE_EPHEMERAL_CREDENTIALS".to_string()
}

fn default_metadata_endpoint() -> String {
    "http://metadata.google.internal".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 3: Validate parsed config
        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::AppResult<()> {
        let storage = &self.storage;

        for (field, value) in [
            ("storage.bucket", &storage.bucket),
            ("storage.object_prefix", &storage.object_prefix),
            ("storage.extension", &storage.extension),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::AppError::Config(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        for (field, value) in [
            ("storage.endpoint", &storage.endpoint),
            ("storage.metadata_endpoint", &storage.metadata_endpoint),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(crate::error::AppError::Config(format!(
                    "{} must start with http:// or https://, got '{}'",
                    field, value
                )));
            }
        }

        if storage.request_timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "storage.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if storage.request_timeout_seconds > 300 {
            return Err(crate::error::AppError::Config(format!(
                "storage.request_timeout_seconds cannot exceed 300 seconds (5 minutes), got {}",
                storage.request_timeout_seconds
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}
