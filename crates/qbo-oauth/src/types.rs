//! Value types passed into and returned from the flow.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::FlowError;

/// Application credentials registered with the provider.
///
/// Supplied fresh by the caller for each flow attempt and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
}

impl ClientCredentials {
    /// Creates a new set of credentials.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Checks that every field is present.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<(), FlowError> {
        require("client_id", &self.client_id)?;
        require("client_secret", &self.client_secret)?;
        require("redirect_uri", &self.redirect_uri)?;
        Ok(())
    }
}

// Keeps the secret out of logs and panic messages.
impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Token endpoint response.
///
/// The caller owns storage and renewal; nothing here is retained after the
/// call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer credential for API calls.
    pub access_token: String,

    /// Credential for obtaining the next access token. Supersedes the one
    /// used in a refresh request.
    pub refresh_token: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Token type (the provider sends `bearer`).
    pub token_type: String,

    /// Refresh token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_refresh_token_expires_in: Option<u64>,

    /// OpenID Connect ID token, present when the `openid` scope was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Returns when the access token expires, given when it was issued.
    #[must_use]
    pub fn access_token_expires_at(&self, issued_at: OffsetDateTime) -> OffsetDateTime {
        issued_at.saturating_add(seconds(self.expires_in))
    }

    /// Returns when the refresh token expires, if the provider reported it.
    #[must_use]
    pub fn refresh_token_expires_at(&self, issued_at: OffsetDateTime) -> Option<OffsetDateTime> {
        self.x_refresh_token_expires_in
            .map(|secs| issued_at.saturating_add(seconds(secs)))
    }

    /// Returns `true` if the access token issued at `issued_at` has expired by `now`.
    #[must_use]
    pub fn is_access_token_expired(&self, issued_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        now >= self.access_token_expires_at(issued_at)
    }

    /// Returns `true` if the token type is bearer (case-insensitive).
    #[must_use]
    pub fn is_bearer(&self) -> bool {
        self.token_type.eq_ignore_ascii_case("bearer")
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        return Err(FlowError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
