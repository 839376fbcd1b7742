//! OAuth credentials for read-only object storage access
//!
//! Credentials are an explicit value handed to `GcsSource`. Reading them from
//! the process environment is the binary's job, not the library's.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// OAuth scope requested for every token: read-only object access
pub const READ_ONLY_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_only";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service account key file contents
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// User credentials produced by an interactive login
#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    client_secret: String,
    refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

/// How requests to the object store are authenticated
#[derive(Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    /// Default credentials from the metadata server
    Ambient,
    /// No credentials at all
    Anonymous,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Credentials {
    /// Parse a credential JSON blob (service account key or authorized user)
    ///
    /// # Errors
    ///
    /// Returns `AppError::Connection` if the blob is not valid credential
    /// JSON, since no authenticated connection can be made with it.
    pub fn from_json(json: &[u8]) -> AppResult<Self> {
        let file: CredentialsFile =
            serde_json::from_slice(json).map_err(|e| AppError::Connection {
                reason: format!("invalid credentials JSON: {}", e),
            })?;
        Ok(match file {
            CredentialsFile::ServiceAccount(key) => Self::ServiceAccount(key),
            CredentialsFile::AuthorizedUser(user) => Self::AuthorizedUser(user),
        })
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
            Self::Ambient => "ambient",
            Self::Anonymous => "anonymous",
        }
    }

    /// Obtain a bearer token scoped to read-only storage access
    ///
    /// Returns `None` for anonymous credentials.
    pub async fn access_token(
        &self,
        http: &reqwest::Client,
        metadata_endpoint: &str,
    ) -> AppResult<Option<String>> {
        let request = match self {
            Self::Anonymous => return Ok(None),
            Self::ServiceAccount(key) => {
                let assertion = key.signed_assertion()?;
                http.post(&key.token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            Self::AuthorizedUser(user) => http.post(&user.token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
                ("scope", READ_ONLY_SCOPE),
            ]),
            Self::Ambient => {
                let url = format!(
                    "{}/computeMetadata/v1/instance/service-accounts/default/token",
                    metadata_endpoint.trim_end_matches('/')
                );
                http.get(url)
                    .header("Metadata-Flavor", "Google")
                    .query(&[("scopes", READ_ONLY_SCOPE)])
            }
        };

        let response = request.send().await.map_err(|e| AppError::Connection {
            reason: format!("{} token request failed: {}", self.kind(), e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Connection {
                reason: format!(
                    "{} token request rejected with HTTP {}",
                    self.kind(),
                    status.as_u16()
                ),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| AppError::Connection {
            reason: format!("{} token response unreadable: {}", self.kind(), e),
        })?;

        tracing::debug!(credentials = self.kind(), "Obtained access token");
        Ok(Some(token.access_token))
    }
}

impl ServiceAccountKey {
    fn signed_assertion(&self) -> AppResult<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Connection {
                reason: format!("system clock before UNIX epoch: {}", e),
            })?
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: READ_ONLY_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = jsonwebtoken::EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(
            |e| AppError::Connection {
                reason: format!("invalid service account private key: {}", e),
            },
        )?;

        jsonwebtoken::encode(&header, &claims, &key).map_err(|e| AppError::Connection {
            reason: format!("failed to sign service account assertion: {}", e),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(key) => f
                .debug_struct("ServiceAccount")
                .field("client_email", &key.client_email)
                .field("token_uri", &key.token_uri)
                .finish_non_exhaustive(),
            Self::AuthorizedUser(user) => f
                .debug_struct("AuthorizedUser")
                .field("client_id", &user.client_id)
                .field("token_uri", &user.token_uri)
                .finish_non_exhaustive(),
            Self::Ambient => f.write_str("Ambient"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}
