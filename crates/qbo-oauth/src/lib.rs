//! # qbo-oauth
//!
//! OAuth 2.0 authorization-code flow helper for the QuickBooks Online
//! (Intuit) accounting API.
//!
//! This crate provides:
//! - Authorization URL construction with state generation
//! - Redirect URL parsing (code, state, realm ID, consent errors)
//! - Code-for-token exchange and refresh-token rotation
//! - A minimal accounting API client for calls made with the resulting token
//!
//! Nothing is persisted. Every operation takes what it needs as arguments and
//! returns what the next step needs.
//!
//! ## Modules
//!
//! - [`authorize`] - Authorization URL builder and scopes
//! - [`redirect`] - Redirect URL parser
//! - [`token`] - Token exchange and refresh
//! - [`api`] - Accounting API calls
//! - [`config`] - Client configuration and provider endpoints
//! - [`error`] - Error types
//! - [`types`] - Credentials and token values

pub mod api;
pub mod authorize;
pub mod config;
pub mod error;
pub mod redirect;
pub mod token;
pub mod types;

pub use api::AccountingClient;
pub use authorize::{
    AuthorizationRequest, AuthorizationUrl, DEFAULT_SCOPE, build_authorization_url,
    generate_state, scopes,
};
pub use config::{ConfigError, Environment, OAuthClientConfig, ProviderEndpoints};
pub use error::{ErrorKind, FlowError};
pub use redirect::{RedirectResult, parse_redirect};
pub use token::OAuthClient;
pub use types::{ClientCredentials, TokenResponse};
