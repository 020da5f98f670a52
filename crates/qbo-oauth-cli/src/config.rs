use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use qbo_oauth::{ClientCredentials, OAuthClientConfig};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "qbo-oauth.toml";
pub const ENV_PREFIX: &str = "QBO_OAUTH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub oauth: OAuthClientConfig,
    pub credentials: CredentialsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CredentialsConfig {
    /// Applies command-line values on top of the loaded ones.
    pub fn merge_overrides(
        &mut self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        redirect_uri: Option<&str>,
    ) {
        if let Some(v) = client_id {
            self.client_id = Some(v.to_string());
        }
        if let Some(v) = client_secret {
            self.client_secret = Some(v.to_string());
        }
        if let Some(v) = redirect_uri {
            self.redirect_uri = Some(v.to_string());
        }
    }

    pub fn client_id(&self) -> Result<&str> {
        self.client_id.as_deref().context(
            "No client ID configured. Use --client-id, set QBO_CLIENT_ID, or add credentials.client_id to the config file",
        )
    }

    pub fn redirect_uri(&self) -> Result<&str> {
        self.redirect_uri.as_deref().context(
            "No redirect URI configured. Use --redirect-uri, set QBO_REDIRECT_URI, or add credentials.redirect_uri to the config file",
        )
    }

    /// Full credentials for the token endpoint.
    pub fn to_client_credentials(&self) -> Result<ClientCredentials> {
        let client_secret = self.client_secret.as_deref().context(
            "No client secret configured. Use --client-secret, set QBO_CLIENT_SECRET, or add credentials.client_secret to the config file",
        )?;
        Ok(ClientCredentials::new(
            self.client_id()?,
            client_secret,
            self.redirect_uri()?,
        ))
    }

    /// Copy suitable for display.
    pub fn masked(&self) -> Self {
        Self {
            client_secret: self.client_secret.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

/// Where the config file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    WorkingDir(PathBuf),
    Home(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::WorkingDir(p) => write!(f, "{}", p.display()),
            Self::Home(p) => write!(f, "{} (home)", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".qbo-oauth").join("config.toml"))
}

/// Picks the config file: the explicit path, then `./qbo-oauth.toml`, then
/// `~/.qbo-oauth/config.toml`.
pub fn resolve_config_source(explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Flag(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return ConfigSource::WorkingDir(local);
    }
    match home_config_path() {
        Some(path) if path.exists() => ConfigSource::Home(path),
        _ => ConfigSource::Defaults,
    }
}

/// Loads the config file (if any) and applies `QBO_OAUTH__*` overrides.
pub fn load_config(source: &ConfigSource) -> Result<AppConfig> {
    let mut builder = Config::builder();

    match source {
        ConfigSource::Flag(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path.as_path()));
        }
        ConfigSource::WorkingDir(path) | ConfigSource::Home(path) => {
            builder = builder.add_source(File::from(path.as_path()));
        }
        ConfigSource::Defaults => {}
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .separator("__"),
    );

    let cfg: AppConfig = builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    cfg.oauth
        .validate()
        .context("Invalid [oauth] configuration")?;

    Ok(cfg)
}
