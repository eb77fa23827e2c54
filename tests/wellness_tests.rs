//! Integration tests for the wellness API over the full transport stack.

use infosight_client::{AuthStyle, InfoSightClient, InfoSightError, WellnessService};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "token_type": "BearerToken",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> InfoSightClient {
    InfoSightClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .login("key", "secret")
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_issues_success() {
    let server = setup_mock_server().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/issues"))
        .and(query_param("domain", "urn:nimble"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"message": "ok"},
            "data": [{"id": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.wellness().fetch_issues().await.unwrap();

    assert_eq!(response.data(), &[json!({"id": 1})]);
}

#[tokio::test]
async fn test_fetch_issues_fault() {
    let server = setup_mock_server().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/issues"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"fault": {"faultstring": "forbidden"}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.wellness().fetch_issues().await.unwrap_err();

    assert!(err.is_fault());
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.to_string(), "forbidden");
}

#[tokio::test]
async fn test_token_endpoint_failure() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "bad credentials"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.wellness().fetch_issues().await.unwrap_err();

    assert!(matches!(err, InfoSightError::Token { status: Some(401), .. }));
}

#[tokio::test]
async fn test_token_is_reused_across_calls() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/arrays"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let wellness = client.wellness();
    wellness.fetch_object_set("arrays").await.unwrap();
    wellness.fetch_object_set("arrays").await.unwrap();
}

#[tokio::test]
async fn test_credentials_in_params() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(body_string_contains("client_id=key"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-www-form-urlencoded")
                .set_body_string("access_token=xyz&token_type=bearer&expires_in=60"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v2/issues"))
        .and(header("Authorization", "Bearer xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = InfoSightClient::builder()
        .base_url(format!("{}/api/", server.uri()))
        .login("key", "secret")
        .auth_style(AuthStyle::InParams)
        .api_version("v2")
        .build()
        .unwrap();

    let response = client.wellness().fetch_issues().await.unwrap();
    assert!(response.data().is_empty());
}

#[tokio::test]
async fn test_http_client_timeout() {
    let server = setup_mock_server().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/issues"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = InfoSightClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .login("key", "secret")
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.wellness().fetch_issues().await.unwrap_err();
    assert!(matches!(err, InfoSightError::Timeout));
}

#[tokio::test]
async fn test_trace_enabled_over_real_stack() {
    let server = setup_mock_server().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/wellness/v1/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 2}]})))
        .mount(&server)
        .await;

    let client = InfoSightClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .login("key", "secret")
        .trace(true)
        .build()
        .unwrap();

    let response = client.wellness().fetch_issues().await.unwrap();
    assert_eq!(response.data().len(), 1);
}
