//! Integration tests for the object storage source
//!
//! A wiremock server stands in for both the storage JSON API and the
//! OAuth/metadata token endpoints, so these tests verify the exact HTTP
//! requests made and how each failure mode is classified.

use test_selector::config::StorageConfig;
use test_selector::error::AppError;
use test_selector::source::credentials::READ_ONLY_SCOPE;
use test_selector::source::{Credentials, GcsSource, StatisticsSource};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OBJECT_PATH: &str = "/storage/v1/b/stats/o/tests-nightly-gce.csv";
const PAYLOAD: &str = "TEST_NAME,SELECTED,AVG_DURATION,TOTAL_RUNS\nkv/splits,no,1200,30\n";

fn storage_for(server: &MockServer) -> StorageConfig {
    StorageConfig::default()
        .with_endpoint(server.uri())
        .with_metadata_endpoint(server.uri())
        .with_bucket("stats")
}

fn authorized_user(token_uri: &str) -> Credentials {
    let json = format!(
        r#"{{
            "type": "authorized_user",
            "client_id": "ci-client",
            "client_secret": "ci-secret",
            "refresh_token": "ci-refresh",
            "token_uri": "{}"
        }}"#,
        token_uri
    );
    Credentials::from_json(json.as_bytes()).expect("should parse credentials")
}

#[tokio::test]
async fn test_anonymous_download_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let source = GcsSource::new(storage_for(&server), Credentials::Anonymous)
        .expect("should build source");
    let data = source.fetch("nightly", "gce").await.expect("should download");

    assert_eq!(data, PAYLOAD.as_bytes());
}

#[tokio::test]
async fn test_quota_project_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .and(header("x-goog-user-project", "ci-billing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let storage = storage_for(&server).with_quota_project("ci-billing");
    let source = GcsSource::new(storage, Credentials::Anonymous).expect("should build source");

    source.fetch("nightly", "gce").await.expect("should download");
}

#[tokio::test]
async fn test_authorized_user_token_is_used_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=ci-refresh"))
        .and(body_string_contains("devstorage.read_only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "user-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = authorized_user(&format!("{}/token", server.uri()));
    let source = GcsSource::new(storage_for(&server), credentials).expect("should build source");

    source.fetch("nightly", "gce").await.expect("should download");
}

#[tokio::test]
async fn test_ambient_credentials_query_metadata_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .and(header("metadata-flavor", "Google"))
        .and(query_param("scopes", READ_ONLY_SCOPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "vm-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .and(header("authorization", "Bearer vm-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let source = GcsSource::new(storage_for(&server), Credentials::Ambient)
        .expect("should build source");

    source.fetch("nightly", "gce").await.expect("should download");
}

#[tokio::test]
async fn test_missing_object_is_object_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = GcsSource::new(storage_for(&server), Credentials::Anonymous)
        .expect("should build source");

    match source.fetch("nightly", "gce").await {
        Err(AppError::ObjectNotFound { bucket, object }) => {
            assert_eq!(bucket, "stats");
            assert_eq!(object, "tests-nightly-gce.csv");
        }
        other => panic!("Expected ObjectNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_object_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let source = GcsSource::new(storage_for(&server), Credentials::Anonymous)
        .expect("should build source");

    match source.fetch("nightly", "gce").await {
        Err(AppError::Fetch { status, object, .. }) => {
            assert_eq!(status, 403);
            assert_eq!(object, "tests-nightly-gce.csv");
        }
        other => panic!("Expected Fetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_token_request_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = authorized_user(&format!("{}/token", server.uri()));
    let source = GcsSource::new(storage_for(&server), credentials).expect("should build source");

    let err = source
        .fetch("nightly", "gce")
        .await
        .expect_err("token rejection should fail");
    assert!(matches!(err, AppError::Connection { .. }), "got {:?}", err);
    assert!(err.to_string().contains("HTTP 401"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    // Port 1 on loopback refuses connections immediately
    let storage = StorageConfig::default()
        .with_endpoint("http://127.0.0.1:1")
        .with_bucket("stats");
    let source = GcsSource::new(storage, Credentials::Anonymous).expect("should build source");

    let err = source
        .fetch("nightly", "gce")
        .await
        .expect_err("refused connection should fail");
    assert!(matches!(err, AppError::Connection { .. }), "got {:?}", err);
}
