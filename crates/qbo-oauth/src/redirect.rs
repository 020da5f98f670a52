//! Redirect URL parsing.
//!
//! After consent the provider sends the browser back to the registered
//! redirect URI with either a `code` or an `error` in the query string:
//!
//! ```text
//! https://app.example.com/callback?code=AB11...&state=xyz&realmId=4620816365
//! https://app.example.com/callback?error=access_denied&state=xyz
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FlowError;

/// Values recovered from a successful redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectResult {
    /// Single-use authorization code.
    pub code: String,
    /// Company (realm) ID the user selected. Not every redirect carries one.
    pub realm_id: Option<String>,
    /// State echoed back by the provider.
    pub state: String,
}

impl RedirectResult {
    /// Checks the echoed state against the one issued with the authorization URL.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::StateMismatch`] if they differ.
    pub fn verify_state(&self, expected: &str) -> Result<(), FlowError> {
        if self.state != expected {
            tracing::warn!("Redirect state does not match the issued state");
            return Err(FlowError::StateMismatch);
        }
        Ok(())
    }
}

/// Parses the redirect URL the provider sent the user's browser to.
///
/// # Errors
///
/// - [`FlowError::MalformedRedirect`] if `redirect_url` is not a valid URL
/// - [`FlowError::ConsentDenied`] if the provider reported an `error`
/// - [`FlowError::MissingParameter`] if `code` or `state` is absent or blank
pub fn parse_redirect(redirect_url: &str) -> Result<RedirectResult, FlowError> {
    let url = Url::parse(redirect_url.trim())
        .map_err(|e| FlowError::malformed_redirect(e.to_string()))?;

    let mut code = None;
    let mut state = None;
    let mut realm_id = None;
    let mut error = None;
    let mut error_description = None;

    // First occurrence wins for repeated parameters.
    for (key, value) in url.query_pairs() {
        let slot = match key.as_ref() {
            "code" => &mut code,
            "state" => &mut state,
            "realmId" => &mut realm_id,
            "error" => &mut error,
            "error_description" => &mut error_description,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    if let Some(error) = error.filter(|e| !e.is_empty()) {
        tracing::warn!(error = %error, "Provider redirected with an error");
        return Err(FlowError::consent_denied(error, error_description));
    }

    let code = non_empty(code).ok_or_else(|| FlowError::missing_parameter("code"))?;
    let state = non_empty(state).ok_or_else(|| FlowError::missing_parameter("state"))?;
    let realm_id = non_empty(realm_id);

    tracing::debug!(
        realm_id = realm_id.as_deref().unwrap_or("-"),
        "Parsed authorization redirect"
    );

    Ok(RedirectResult {
        code,
        realm_id,
        state,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
