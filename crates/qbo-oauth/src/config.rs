//! Client configuration and provider endpoint resolution.
//!
//! # Example (TOML)
//!
//! ```toml
//! [oauth]
//! environment = "sandbox"
//! request_timeout = "10s"
//!
//! # Optional endpoint overrides
//! token_endpoint = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Intuit authorization endpoint (same for production and sandbox).
pub const AUTHORIZATION_ENDPOINT: &str = "https://appcenter.intuit.com/connect/oauth2";

/// Intuit token endpoint (same for production and sandbox).
pub const TOKEN_ENDPOINT: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

/// Accounting API base URL for production companies.
pub const PRODUCTION_API_BASE: &str = "https://quickbooks.api.intuit.com";

/// Accounting API base URL for sandbox companies.
pub const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com";

/// Default ceiling for a single provider request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider environment.
///
/// OAuth endpoints are shared; only the accounting API host differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live companies.
    #[default]
    Production,
    /// Developer sandbox companies.
    Sandbox,
}

impl Environment {
    /// Returns the accounting API base URL for this environment.
    #[must_use]
    pub fn api_base(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_BASE,
            Self::Sandbox => SANDBOX_API_BASE,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// Configuration for [`OAuthClient`](crate::OAuthClient) and
/// [`AccountingClient`](crate::AccountingClient).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthClientConfig {
    /// Provider environment (default: production).
    pub environment: Environment,

    /// Override for the authorization endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Override for the token endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// Override for the accounting API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Timeout for a single provider request (default: 10 seconds).
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Whether to allow plain HTTP endpoints (for testing only).
    pub allow_http: bool,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            authorization_endpoint: None,
            token_endpoint: None,
            api_base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            allow_http: false,
            user_agent: concat!("qbo-oauth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl OAuthClientConfig {
    /// Creates a configuration for the given environment.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Creates a sandbox configuration.
    #[must_use]
    pub fn sandbox() -> Self {
        Self::new(Environment::Sandbox)
    }

    /// Sets the authorization endpoint override.
    #[must_use]
    pub fn with_authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the token endpoint override.
    #[must_use]
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the accounting API base URL override.
    #[must_use]
    pub fn with_api_base_url(mut self, base: impl Into<String>) -> Self {
        self.api_base_url = Some(base.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Allows HTTP endpoints (for testing only).
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Sets the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the user agent is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - The request timeout is zero
    /// - An endpoint override is not a valid absolute URL
    /// - An endpoint uses plain HTTP while `allow_http` is off
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "request_timeout must be > 0".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Missing("user_agent".to_string()));
        }

        self.endpoints().map(|_| ())
    }

    /// Resolves the effective provider endpoints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an endpoint cannot be parsed or
    /// violates the HTTPS requirement.
    pub fn endpoints(&self) -> Result<ProviderEndpoints, ConfigError> {
        let authorization_endpoint = self.parse_endpoint(
            "authorization_endpoint",
            self.authorization_endpoint
                .as_deref()
                .unwrap_or(AUTHORIZATION_ENDPOINT),
        )?;
        let token_endpoint = self.parse_endpoint(
            "token_endpoint",
            self.token_endpoint.as_deref().unwrap_or(TOKEN_ENDPOINT),
        )?;
        let api_base_url = self.parse_endpoint(
            "api_base_url",
            self.api_base_url
                .as_deref()
                .unwrap_or(self.environment.api_base()),
        )?;

        Ok(ProviderEndpoints {
            authorization_endpoint,
            token_endpoint,
            api_base_url,
        })
    }

    fn parse_endpoint(&self, name: &str, value: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidValue(format!("{name} '{value}': {e}")))?;

        match url.scheme() {
            "https" => Ok(url),
            "http" if self.allow_http => Ok(url),
            "http" => Err(ConfigError::InvalidValue(format!(
                "{name} must use HTTPS (set allow_http for testing): {value}"
            ))),
            other => Err(ConfigError::InvalidValue(format!(
                "{name} has unsupported scheme '{other}'"
            ))),
        }
    }
}

/// Resolved provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Where the user's browser is sent to grant consent.
    pub authorization_endpoint: Url,
    /// Where codes and refresh tokens are exchanged.
    pub token_endpoint: Url,
    /// Accounting API base URL.
    pub api_base_url: Url,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
