//! Authorization URL construction.
//!
//! The first step of the flow: build the URL the user's browser is sent to so
//! they can grant the application access to a company.
//!
//! # Example
//!
//! ```ignore
//! use qbo_oauth::authorize::{AuthorizationRequest, scopes};
//!
//! let request = AuthorizationRequest::new("client-id", "https://app.example.com/callback")
//!     .with_scopes([scopes::ACCOUNTING, scopes::OPENID]);
//!
//! let auth_url = request.build(&endpoints.authorization_endpoint)?;
//! // Redirect the user to auth_url.url, remember auth_url.state
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

use crate::error::FlowError;
use crate::types::require;

/// Well-known Intuit scopes.
pub mod scopes {
    /// QuickBooks Online accounting API.
    pub const ACCOUNTING: &str = "com.intuit.quickbooks.accounting";
    /// QuickBooks Payments API.
    pub const PAYMENT: &str = "com.intuit.quickbooks.payment";
    /// OpenID Connect.
    pub const OPENID: &str = "openid";
    /// User profile (given and family name).
    pub const PROFILE: &str = "profile";
    /// User email address.
    pub const EMAIL: &str = "email";
    /// User phone number.
    pub const PHONE: &str = "phone";
    /// User physical address.
    pub const ADDRESS: &str = "address";
}

/// Scope requested when the caller does not name one.
pub const DEFAULT_SCOPE: &str = scopes::ACCOUNTING;

/// Parameters for one authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// OAuth client ID.
    pub client_id: String,
    /// Registered redirect URI.
    pub redirect_uri: String,
    /// Space-separated scope string.
    pub scope: String,
    /// Caller-supplied state; generated when absent.
    pub state: Option<String>,
}

impl AuthorizationRequest {
    /// Creates a request for the default accounting scope.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            state: None,
        }
    }

    /// Sets the scope string verbatim.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the scopes, joined with a single space.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope = scopes
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self
    }

    /// Sets the state token.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Builds the authorization URL on the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Validation`] if the client ID, redirect URI, scope
    /// or an explicitly supplied state is empty.
    pub fn build(&self, authorization_endpoint: &Url) -> Result<AuthorizationUrl, FlowError> {
        require("client_id", &self.client_id)?;
        require("redirect_uri", &self.redirect_uri)?;
        require("scope", &self.scope)?;

        let state = match &self.state {
            Some(state) => {
                require("state", state)?;
                state.clone()
            }
            None => generate_state(),
        };

        let mut url = authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", &state);

        tracing::debug!(
            client_id = %self.client_id,
            scope = %self.scope,
            "Generated authorization URL for {}",
            authorization_endpoint
        );

        Ok(AuthorizationUrl { url, state })
    }
}

/// Builds an authorization URL; see [`AuthorizationRequest::build`].
///
/// # Errors
///
/// Returns [`FlowError::Validation`] if a required field is empty.
pub fn build_authorization_url(
    authorization_endpoint: &Url,
    request: &AuthorizationRequest,
) -> Result<AuthorizationUrl, FlowError> {
    request.build(authorization_endpoint)
}

/// A built authorization URL and the state embedded in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrl {
    /// The URL to send the user's browser to.
    pub url: Url,
    /// The state to compare against the redirect.
    pub state: String,
}

impl AuthorizationUrl {
    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for AuthorizationUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Generates a random state token.
///
/// 32 random bytes encoded as base64url (43 characters).
#[must_use]
pub fn generate_state() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn endpoint() -> Url {
        Url::parse("https://appcenter.intuit.com/connect/oauth2").unwrap()
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_build_round_trips_parameters() {
        let request =
            AuthorizationRequest::new("ABcd123", "https://app.example.com/callback?x=1&y=2")
                .with_scope("com.intuit.quickbooks.accounting openid")
                .with_state("state with spaces & symbols");

        let auth_url = request.build(&endpoint()).unwrap();
        let params = query(&auth_url.url);

        assert_eq!(params["client_id"], "ABcd123");
        assert_eq!(params["redirect_uri"], "https://app.example.com/callback?x=1&y=2");
        assert_eq!(params["scope"], "com.intuit.quickbooks.accounting openid");
        assert_eq!(params["state"], "state with spaces & symbols");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params.len(), 5);
        assert_eq!(auth_url.state, "state with spaces & symbols");
    }

    #[test]
    fn test_build_keeps_endpoint() {
        let auth_url = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .build(&endpoint())
            .unwrap();
        assert_eq!(auth_url.url.host_str(), Some("appcenter.intuit.com"));
        assert_eq!(auth_url.url.path(), "/connect/oauth2");
        assert!(auth_url.as_str().starts_with("https://appcenter.intuit.com/connect/oauth2?"));
    }

    #[test]
    fn test_default_scope() {
        let auth_url = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .build(&endpoint())
            .unwrap();
        assert_eq!(query(&auth_url.url)["scope"], DEFAULT_SCOPE);
    }

    #[test]
    fn test_with_scopes_joins() {
        let request = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .with_scopes([scopes::ACCOUNTING, " ", scopes::OPENID, scopes::EMAIL]);
        assert_eq!(request.scope, "com.intuit.quickbooks.accounting openid email");
    }

    #[test]
    fn test_generated_state() {
        let a = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .build(&endpoint())
            .unwrap();
        let b = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .build(&endpoint())
            .unwrap();

        assert_eq!(a.state.len(), 43);
        assert_ne!(a.state, b.state);
        assert_eq!(query(&a.url)["state"], a.state);
    }

    #[test]
    fn test_missing_client_id() {
        let err = AuthorizationRequest::new("", "https://app.example.com/cb")
            .build(&endpoint())
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_missing_redirect_uri() {
        let err = build_authorization_url(&endpoint(), &AuthorizationRequest::new("id", "   "))
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("redirect_uri"));
    }

    #[test]
    fn test_empty_scope_and_state_rejected() {
        let err = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .with_scopes(Vec::<&str>::new())
            .build(&endpoint())
            .unwrap_err();
        assert!(err.to_string().contains("scope"));

        let err = AuthorizationRequest::new("id", "https://app.example.com/cb")
            .with_state("")
            .build(&endpoint())
            .unwrap_err();
        assert!(err.to_string().contains("state"));
    }
}
