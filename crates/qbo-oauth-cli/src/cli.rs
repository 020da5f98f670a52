use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "qbo-oauth")]
#[command(about = "Walk through the QuickBooks Online OAuth 2.0 authorization-code flow")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "QBO_OAUTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// OAuth client ID (overrides config)
    #[arg(long, global = true, env = "QBO_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (overrides config)
    #[arg(long, global = true, env = "QBO_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Registered redirect URI (overrides config)
    #[arg(long, global = true, env = "QBO_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Use the sandbox accounting API
    #[arg(long, global = true)]
    pub sandbox: bool,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the authorization URL to send the user to
    AuthorizeUrl(AuthorizeUrlArgs),
    /// Extract the code, realm ID and state from a redirect URL
    ParseRedirect(ParseRedirectArgs),
    /// Exchange an authorization code for tokens
    Exchange(ExchangeArgs),
    /// Exchange a refresh token for a new token pair
    Refresh(RefreshArgs),
    /// Call the accounting API with an access token
    Call(CallArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct AuthorizeUrlArgs {
    /// Scope to request; repeat for several (default: accounting)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,
    /// State to embed instead of a generated one
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(clap::Args)]
pub struct ParseRedirectArgs {
    /// Full redirect URL from the browser address bar
    pub url: String,
    /// State issued with the authorization URL
    #[arg(long)]
    pub expect_state: Option<String>,
}

#[derive(clap::Args)]
pub struct ExchangeArgs {
    /// Authorization code
    #[arg(long, conflicts_with = "redirect_url", required_unless_present = "redirect_url")]
    pub code: Option<String>,
    /// Full redirect URL; the code is taken from it
    #[arg(long)]
    pub redirect_url: Option<String>,
    /// State issued with the authorization URL (only with --redirect-url)
    #[arg(long, requires = "redirect_url")]
    pub expect_state: Option<String>,
}

#[derive(clap::Args)]
pub struct RefreshArgs {
    /// Current refresh token
    #[arg(long, env = "QBO_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,
}

#[derive(clap::Args)]
pub struct CallArgs {
    /// Company (realm) ID
    #[arg(long)]
    pub realm_id: String,
    /// Access token
    #[arg(long, env = "QBO_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,
    /// Endpoint relative to /v3/company/{realm_id}/ (default: company info)
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
}
