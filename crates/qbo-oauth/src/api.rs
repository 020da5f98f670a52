//! Accounting API calls made with an access token.
//!
//! Only the plumbing needed to confirm a token works: a bearer-authenticated
//! GET against `/v3/company/{realm_id}/{endpoint}`. Callers decide when a token
//! needs refreshing; nothing here refreshes on their behalf.

use reqwest::header::{ACCEPT, HeaderValue};
use url::Url;

use crate::config::{ConfigError, OAuthClientConfig};
use crate::error::FlowError;
use crate::token::{build_http_client, provider_rejection};
use crate::types::require;

/// Client for the QuickBooks Online accounting API.
#[derive(Debug, Clone)]
pub struct AccountingClient {
    http_client: reqwest::Client,
    api_base_url: Url,
}

impl AccountingClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: OAuthClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            http_client: build_http_client(&config)?,
            api_base_url: config.endpoints()?.api_base_url,
        })
    }

    /// Builds the URL for a company-scoped endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Validation`] if the realm ID or endpoint is empty
    /// or produces an invalid URL.
    pub fn company_url(&self, realm_id: &str, endpoint: &str) -> Result<Url, FlowError> {
        require("realm_id", realm_id)?;
        let endpoint = endpoint.trim().trim_start_matches('/');
        require("endpoint", endpoint)?;

        let base = self.api_base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/v3/company/{}/{endpoint}", realm_id.trim()))
            .map_err(|e| FlowError::validation(format!("invalid API URL: {e}")))
    }

    /// Performs a GET against a company-scoped endpoint and returns the JSON body.
    ///
    /// # Errors
    ///
    /// - [`FlowError::Validation`] if the realm ID, endpoint or token is empty
    /// - [`FlowError::Auth`] on 401 or 403
    /// - [`FlowError::Network`] on connection failure or timeout
    /// - [`FlowError::UnexpectedResponse`] on any other status or a non-JSON body
    pub async fn get(
        &self,
        realm_id: &str,
        endpoint: &str,
        access_token: &str,
    ) -> Result<serde_json::Value, FlowError> {
        require("access_token", access_token)?;
        let url = self.company_url(realm_id, endpoint)?;

        tracing::debug!(realm_id, "Calling accounting API: {}", url.path());

        let response = self
            .http_client
            .get(url.as_str())
            .bearer_auth(access_token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(provider_rejection(status.as_u16(), &body));
        }

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), realm_id, "Accounting API call failed");
            return Err(FlowError::unexpected_response(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            FlowError::unexpected_response(
                status.as_u16(),
                format!("Failed to parse API response: {e}"),
            )
        })
    }

    /// Fetches the company's `CompanyInfo` record.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn company_info(
        &self,
        realm_id: &str,
        access_token: &str,
    ) -> Result<serde_json::Value, FlowError> {
        self.get(realm_id, &company_info_endpoint(realm_id), access_token)
            .await
    }
}

/// Relative endpoint for a company's `CompanyInfo` record.
#[must_use]
pub fn company_info_endpoint(realm_id: &str) -> String {
    format!("companyinfo/{}", realm_id.trim())
}
