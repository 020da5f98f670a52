use qbo_oauth::{
    AccountingClient, AuthorizationRequest, ClientCredentials, FlowError, OAuthClient,
    OAuthClientConfig, scopes,
};
use serde_json::json;
use wiremock::matchers::{basic_auth, bearer_token, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OAuthClientConfig {
    OAuthClientConfig::sandbox()
        .with_token_endpoint(format!("{}/oauth2/v1/tokens/bearer", server.uri()))
        .with_api_base_url(server.uri())
        .with_allow_http(true)
}

#[tokio::test]
async fn test_full_authorization_code_flow() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let oauth = OAuthClient::new(config.clone()).unwrap();
    let api = AccountingClient::new(config).unwrap();
    let creds = ClientCredentials::new("ABclient", "s3cret", "https://app.example.com/callback");

    // Step 1: authorization URL
    let auth_url = oauth
        .authorization_url(
            &AuthorizationRequest::new(&creds.client_id, &creds.redirect_uri)
                .with_scopes([scopes::ACCOUNTING, scopes::OPENID]),
        )
        .unwrap();
    assert_eq!(auth_url.url.host_str(), Some("appcenter.intuit.com"));

    // Step 2: the provider redirects back with the issued state
    let redirect_url = format!(
        "https://app.example.com/callback?code=AB11code&state={}&realmId=4620816365",
        auth_url.state
    );

    Mock::given(method("POST"))
        .and(path("/oauth2/v1/tokens/bearer"))
        .and(basic_auth("ABclient", "s3cret"))
        .and(body_string_contains("code=AB11code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "token_type": "bearer",
            "id_token": "eyJhbGciOiJSUzI1NiJ9.e30.sig"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Step 3: exchange
    let (redirect, tokens) = oauth
        .exchange_redirect(&redirect_url, &auth_url.state, &creds)
        .await
        .unwrap();
    assert_eq!(redirect.realm_id.as_deref(), Some("4620816365"));
    assert_eq!(tokens.access_token, "access-1");
    assert!(tokens.id_token.is_some());

    // Step 4: use the token
    Mock::given(method("GET"))
        .and(path("/v3/company/4620816365/companyinfo/4620816365"))
        .and(bearer_token("access-1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "CompanyInfo": {"CompanyName": "Sandbox Company_US_1", "Id": "1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = api
        .company_info("4620816365", &tokens.access_token)
        .await
        .unwrap();
    assert_eq!(info["CompanyInfo"]["CompanyName"], "Sandbox Company_US_1");
}

#[tokio::test]
async fn test_denied_consent_never_reaches_token_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let oauth = OAuthClient::new(config_for(&server)).unwrap();
    let creds = ClientCredentials::new("ABclient", "s3cret", "https://app.example.com/callback");

    let err = oauth
        .exchange_redirect(
            "https://app.example.com/callback?error=access_denied&state=xyz",
            "xyz",
            &creds,
        )
        .await
        .unwrap_err();

    assert!(err.is_consent_denied());
}

#[tokio::test]
async fn test_api_call_with_expired_token_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/company/123/companyinfo/123"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"fault":{"error":[{"message":"message=AuthenticationFailed"}],"type":"AUTHENTICATION"}}"#,
        ))
        .mount(&server)
        .await;

    let api = AccountingClient::new(config_for(&server)).unwrap();
    let err = api.company_info("123", "expired").await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(matches!(err, FlowError::Auth { status: 401, .. }));
}

#[tokio::test]
async fn test_api_call_forbidden_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/company/123/companyinfo/123"))
        .and(bearer_token("no-scope"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let api = AccountingClient::new(config_for(&server)).unwrap();
    let err = api.company_info("123", "no-scope").await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(matches!(err, FlowError::Auth { status: 403, .. }));
    assert_eq!(err.provider_error_code(), Some("Forbidden"));
}

#[tokio::test]
async fn test_api_call_not_found_is_unexpected_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/company/123/invoice/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let api = AccountingClient::new(config_for(&server)).unwrap();
    let err = api.get("123", "invoice/999", "token").await.unwrap_err();

    assert!(matches!(err, FlowError::UnexpectedResponse { status: 404, .. }));
}
