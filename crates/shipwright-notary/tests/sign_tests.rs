//! Sign round-trip tests against a mock notary service

use shipwright_core::NotarySettings;
use shipwright_notary::NotaryClient;
use std::fs;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> NotarySettings {
    NotarySettings {
        url: server.uri(),
        signing_key: "release-key".to_string(),
        comment: "automated release signing".to_string(),
        secret: "111111111aaaaaA".to_string(),
    }
}

#[tokio::test]
async fn test_sign_replaces_file_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sign"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "permalink": "signed/abc123"
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/signed/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"SIGNED CONTENTS".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("vessel.dmg");
    fs::write(&artifact, b"unsigned contents").unwrap();

    let client = NotaryClient::new(settings_for(&server));
    client.sign(&artifact).await.unwrap();

    assert_eq!(fs::read(&artifact).unwrap(), b"SIGNED CONTENTS");
}

#[tokio::test]
async fn test_missing_permalink_is_protocol_error_and_leaves_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("vessel.dmg");
    fs::write(&artifact, b"unsigned contents").unwrap();

    let client = NotaryClient::new(settings_for(&server));
    let err = client.sign(&artifact).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<shipwright_core::Error>(),
        Some(shipwright_core::Error::MissingResponseField { field }) if field == "permalink"
    ));
    assert_eq!(fs::read(&artifact).unwrap(), b"unsigned contents");
}

#[tokio::test]
async fn test_service_error_leaves_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sign"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("vessel.dmg");
    fs::write(&artifact, b"unsigned contents").unwrap();

    let client = NotaryClient::new(settings_for(&server));
    assert!(client.sign(&artifact).await.is_err());
    assert_eq!(fs::read(&artifact).unwrap(), b"unsigned contents");
}

#[tokio::test]
async fn test_failed_signed_download_leaves_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sign"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "permalink": "signed/abc123"
            })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/signed/abc123"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("vessel.dmg");
    fs::write(&artifact, b"unsigned contents").unwrap();

    let client = NotaryClient::new(settings_for(&server));
    assert!(client.sign(&artifact).await.is_err());
    assert_eq!(fs::read(&artifact).unwrap(), b"unsigned contents");
}

#[tokio::test]
async fn test_missing_local_file_is_error() {
    let server = MockServer::start().await;
    let client = NotaryClient::new(settings_for(&server));

    let err = client
        .sign(std::path::Path::new("/definitely/not/here.dmg"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<shipwright_core::Error>(),
        Some(shipwright_core::Error::FileNotFound { .. })
    ));
}
