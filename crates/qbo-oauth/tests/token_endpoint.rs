use std::time::Duration;

use qbo_oauth::{ClientCredentials, FlowError, OAuthClient, OAuthClientConfig};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/oauth2/v1/tokens/bearer";

fn credentials() -> ClientCredentials {
    ClientCredentials::new("ABclient", "s3cret", "https://app.example.com/callback")
}

fn client_for(server: &MockServer) -> OAuthClient {
    let config = OAuthClientConfig::default()
        .with_token_endpoint(format!("{}{TOKEN_PATH}", server.uri()))
        .with_allow_http(true);
    OAuthClient::new(config).unwrap()
}

fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 3600,
        "token_type": "bearer",
        "x_refresh_token_expires_in": 8726400
    })
}

#[tokio::test]
async fn test_exchange_code_posts_form_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth("ABclient", "s3cret"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=AB11code"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-1")))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client_for(&server)
        .exchange_code("AB11code", &credentials())
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.refresh_token, "refresh-1");
    assert_eq!(tokens.expires_in, 3600);
    assert_eq!(tokens.x_refresh_token_expires_in, Some(8726400));
    assert!(tokens.is_bearer());
}

#[tokio::test]
async fn test_refresh_returns_rotated_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth("ABclient", "s3cret"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-2", "new-refresh")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client_for(&server)
        .refresh_token("old-refresh", &credentials())
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(tokens.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .exchange_code("AB11code", &credentials())
        .await
        .unwrap_err();

    assert!(err.is_auth_error(), "expected auth error, got {err:?}");
    assert!(!err.is_network_error());
    assert!(matches!(err, FlowError::Auth { status: 401, .. }));
    assert_eq!(err.provider_error_code(), Some("invalid_client"));
}

#[tokio::test]
async fn test_invalid_grant_keeps_provider_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Incorrect or invalid refresh token"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .refresh_token("stale", &credentials())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Incorrect or invalid refresh token"));
}

#[tokio::test]
async fn test_rate_limited_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .refresh_token("refresh", &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Auth { status: 429, .. }));
    assert_eq!(err.provider_error_code(), Some("Too Many Requests"));
}

#[tokio::test]
async fn test_server_error_is_unexpected_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .exchange_code("AB11code", &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::UnexpectedResponse { status: 503, .. }));
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_unparseable_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "only"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .exchange_code("AB11code", &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::UnexpectedResponse { status: 200, .. }));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("late", "late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = OAuthClientConfig::default()
        .with_token_endpoint(format!("{}{TOKEN_PATH}", server.uri()))
        .with_allow_http(true)
        .with_request_timeout(Duration::from_millis(200));
    let client = OAuthClient::new(config).unwrap();

    let result = client.exchange_code("AB11code", &credentials()).await;

    match result {
        Err(err) => assert!(err.is_network_error(), "expected network error, got {err:?}"),
        Ok(tokens) => panic!("expected timeout, got tokens: {tokens:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1.
    let config = OAuthClientConfig::default()
        .with_token_endpoint("http://127.0.0.1:1/oauth2/v1/tokens/bearer")
        .with_allow_http(true)
        .with_request_timeout(Duration::from_secs(2));
    let client = OAuthClient::new(config).unwrap();

    let err = client
        .refresh_token("refresh", &credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Network { .. }));
}

#[tokio::test]
async fn test_validation_error_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a", "r")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let no_secret = ClientCredentials::new("ABclient", "", "https://app.example.com/callback");

    let err = client.exchange_code("AB11code", &no_secret).await.unwrap_err();
    assert!(err.is_validation_error());

    let err = client.exchange_code("", &credentials()).await.unwrap_err();
    assert!(err.is_validation_error());
}
