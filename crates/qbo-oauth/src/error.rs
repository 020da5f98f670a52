//! Error types for the OAuth flow helper.
//!
//! Every failure maps to one of four [`ErrorKind`]s so that a front end can
//! render it without matching on individual variants:
//!
//! - **Validation** - bad or missing input, detected before any network call
//! - **Parse** - the redirect URL is malformed, incomplete, or reports that
//!   the user denied consent
//! - **Auth** - the provider rejected the credentials, code or token
//! - **Network** - transport failure, timeout, or an unusable provider reply

use std::fmt;

/// Errors that can occur while driving the authorization-code flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Required input is missing or invalid.
    #[error("Invalid input: {message}")]
    Validation {
        /// Description of the invalid input.
        message: String,
    },

    /// The redirect URL could not be parsed as a URL.
    #[error("Malformed redirect URL: {message}")]
    MalformedRedirect {
        /// The underlying parse failure.
        message: String,
    },

    /// The provider redirected back with an `error` parameter instead of a code.
    #[error("Authorization was not granted: {error}{}", fmt_description(.description))]
    ConsentDenied {
        /// The OAuth error code (e.g. `access_denied`).
        error: String,
        /// Optional `error_description` sent along with the code.
        description: Option<String>,
    },

    /// The redirect URL is missing a required query parameter.
    #[error("Redirect URL is missing the `{name}` parameter")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// The `state` returned on the redirect differs from the one issued.
    #[error("State mismatch: redirect state does not match the issued state")]
    StateMismatch,

    /// The provider rejected the request (HTTP 4xx).
    #[error("Provider rejected the request (HTTP {status}): {error}{}", fmt_description(.description))]
    Auth {
        /// HTTP status code returned by the provider.
        status: u16,
        /// OAuth error code, or the raw response body when none was sent.
        error: String,
        /// Optional provider `error_description`.
        description: Option<String>,
    },

    /// The request could not be completed (connection failure or timeout).
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider answered with a status or body the flow cannot use.
    #[error("Unexpected provider response (HTTP {status}): {body}")]
    UnexpectedResponse {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Raw response body, or a description of why it was unusable.
        body: String,
    },
}

fn fmt_description(description: &Option<String>) -> String {
    match description {
        Some(d) if !d.is_empty() => format!(" - {d}"),
        _ => String::new(),
    }
}

impl FlowError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedRedirect` error.
    #[must_use]
    pub fn malformed_redirect(message: impl Into<String>) -> Self {
        Self::MalformedRedirect {
            message: message.into(),
        }
    }

    /// Creates a new `ConsentDenied` error.
    #[must_use]
    pub fn consent_denied(error: impl Into<String>, description: Option<String>) -> Self {
        Self::ConsentDenied {
            error: error.into(),
            description,
        }
    }

    /// Creates a new `MissingParameter` error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates a new `Auth` error.
    #[must_use]
    pub fn auth(status: u16, error: impl Into<String>, description: Option<String>) -> Self {
        Self::Auth {
            status,
            error: error.into(),
            description,
        }
    }

    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a new `UnexpectedResponse` error.
    #[must_use]
    pub fn unexpected_response(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status,
            body: body.into(),
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::MalformedRedirect { .. } => ErrorKind::Parse,
            Self::ConsentDenied { .. } => ErrorKind::Parse,
            Self::MissingParameter { .. } => ErrorKind::Parse,
            Self::StateMismatch => ErrorKind::Parse,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Network { .. } => ErrorKind::Network,
            Self::UnexpectedResponse { .. } => ErrorKind::Network,
        }
    }

    /// Returns `true` if the input was rejected before any network call.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns `true` if this is a redirect parsing error.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }

    /// Returns `true` if the provider rejected the credentials, code or token.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Returns `true` if this is a transport or provider availability error.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Returns `true` if the user declined the authorization request.
    #[must_use]
    pub fn is_consent_denied(&self) -> bool {
        matches!(self, Self::ConsentDenied { .. })
    }

    /// Returns the provider's OAuth error code, if one was reported.
    #[must_use]
    pub fn provider_error_code(&self) -> Option<&str> {
        match self {
            Self::ConsentDenied { error, .. } | Self::Auth { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FlowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::network(format!("connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// The four error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing input.
    Validation,
    /// Redirect URL problems, including user-denied consent.
    Parse,
    /// Provider rejected credentials, code or token.
    Auth,
    /// Transport failure or timeout.
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Parse => write!(f, "parse"),
            Self::Auth => write!(f, "auth"),
            Self::Network => write!(f, "network"),
        }
    }
}
