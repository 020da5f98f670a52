//! Token endpoint client.
//!
//! This module provides the [`OAuthClient`] for the two network steps of the
//! authorization-code flow.
//!
//! # Overview
//!
//! 1. **Authorization URL** - [`OAuthClient::authorization_url`]
//! 2. **Redirect** - [`parse_redirect`](crate::redirect::parse_redirect)
//! 3. **Exchange** - [`OAuthClient::exchange_code`]
//! 4. **Refresh** - [`OAuthClient::refresh_token`]
//!
//! The client holds no flow state. Each call makes at most one request, and
//! whatever the next step needs (state, code, tokens) is returned to the caller.
//!
//! # Example
//!
//! ```ignore
//! use qbo_oauth::{ClientCredentials, OAuthClient, OAuthClientConfig, AuthorizationRequest};
//!
//! let client = OAuthClient::new(OAuthClientConfig::default())?;
//! let creds = ClientCredentials::new("id", "secret", "https://app.example.com/callback");
//!
//! let auth_url = client.authorization_url(
//!     &AuthorizationRequest::new(&creds.client_id, &creds.redirect_uri),
//! )?;
//!
//! // ... user consents, browser lands on the redirect URI ...
//!
//! let (redirect, tokens) = client
//!     .exchange_redirect(&redirect_url, &auth_url.state, &creds)
//!     .await?;
//!
//! let refreshed = client.refresh_token(&tokens.refresh_token, &creds).await?;
//! ```

use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;

use crate::authorize::{AuthorizationRequest, AuthorizationUrl};
use crate::config::{ConfigError, OAuthClientConfig, ProviderEndpoints};
use crate::error::FlowError;
use crate::redirect::{RedirectResult, parse_redirect};
use crate::types::{ClientCredentials, TokenResponse, require};

/// Stateless client for the provider's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// HTTP client for token requests.
    http_client: reqwest::Client,
    /// Resolved provider endpoints.
    endpoints: ProviderEndpoints,
}

impl OAuthClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: OAuthClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        Ok(Self {
            http_client,
            endpoints: config.endpoints()?,
        })
    }

    /// Builds the authorization URL on the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Validation`] if a required field is empty.
    pub fn authorization_url(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationUrl, FlowError> {
        request.build(&self.endpoints.authorization_endpoint)
    }

    /// Exchanges an authorization code for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// - [`FlowError::Validation`] if the code or a credential field is empty
    /// - [`FlowError::Auth`] if the provider answers with a 4xx status
    /// - [`FlowError::Network`] on connection failure or timeout
    /// - [`FlowError::UnexpectedResponse`] on any other status or an unreadable body
    pub async fn exchange_code(
        &self,
        code: &str,
        credentials: &ClientCredentials,
    ) -> Result<TokenResponse, FlowError> {
        require("code", code)?;
        credentials.validate()?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ];

        let tokens = self
            .request_tokens(&params, credentials, "authorization_code")
            .await?;

        tracing::info!(
            client_id = %credentials.client_id,
            expires_in = tokens.expires_in,
            "Exchanged authorization code for tokens"
        );

        Ok(tokens)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The provider rotates refresh tokens: the `refresh_token` in the result
    /// must be used for the next refresh.
    ///
    /// # Errors
    ///
    /// Same as [`exchange_code`](Self::exchange_code).
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        credentials: &ClientCredentials,
    ) -> Result<TokenResponse, FlowError> {
        require("refresh_token", refresh_token)?;
        credentials.validate()?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let tokens = self
            .request_tokens(&params, credentials, "refresh_token")
            .await?;

        tracing::info!(
            client_id = %credentials.client_id,
            expires_in = tokens.expires_in,
            rotated = tokens.refresh_token != refresh_token,
            "Refreshed access token"
        );

        Ok(tokens)
    }

    /// Parses a redirect, checks its state and exchanges the code.
    ///
    /// Returns the parsed redirect alongside the tokens so the caller keeps
    /// the realm ID.
    ///
    /// # Errors
    ///
    /// Any error from [`parse_redirect`], [`RedirectResult::verify_state`] or
    /// [`exchange_code`](Self::exchange_code). Parse and state errors are
    /// raised before any network call.
    pub async fn exchange_redirect(
        &self,
        redirect_url: &str,
        expected_state: &str,
        credentials: &ClientCredentials,
    ) -> Result<(RedirectResult, TokenResponse), FlowError> {
        let redirect = parse_redirect(redirect_url)?;
        redirect.verify_state(expected_state)?;
        let tokens = self.exchange_code(&redirect.code, credentials).await?;
        Ok((redirect, tokens))
    }

    /// Posts a grant to the token endpoint.
    async fn request_tokens(
        &self,
        params: &[(&str, &str)],
        credentials: &ClientCredentials,
        grant_type: &str,
    ) -> Result<TokenResponse, FlowError> {
        let token_endpoint = &self.endpoints.token_endpoint;

        tracing::debug!(grant_type, "Requesting tokens from {}", token_endpoint);

        let response = self
            .http_client
            .post(token_endpoint.as_str())
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_client_error() {
            return Err(provider_rejection(status.as_u16(), &body));
        }

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), grant_type, "Token endpoint failed");
            return Err(FlowError::unexpected_response(status.as_u16(), body));
        }

        serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
            FlowError::unexpected_response(
                status.as_u16(),
                format!("Failed to parse token response: {e}"),
            )
        })
    }
}

/// OAuth error response from the provider.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Maps a 4xx response to [`FlowError::Auth`], keeping the provider's wording.
pub(crate) fn provider_rejection(status: u16, body: &str) -> FlowError {
    let err = match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(oauth_error) => {
            FlowError::auth(status, oauth_error.error, oauth_error.error_description)
        }
        Err(_) => {
            let raw = body.trim();
            let error = if raw.is_empty() {
                format!("HTTP {status}")
            } else {
                raw.to_string()
            };
            FlowError::auth(status, error, None)
        }
    };

    tracing::warn!(
        status,
        error = err.provider_error_code().unwrap_or("-"),
        "Provider rejected the request"
    );

    err
}

pub(crate) fn build_http_client(
    config: &OAuthClientConfig,
) -> Result<reqwest::Client, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}
