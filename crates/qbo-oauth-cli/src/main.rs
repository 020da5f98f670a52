mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use qbo_oauth::{AccountingClient, Environment, FlowError, OAuthClient};

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::config::AppConfig;
use crate::output::print_error;

#[tokio::main]
async fn main() {
    // A missing .env is fine; anything else is worth a warning.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(
            e,
            dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        ) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    if let Err(e) = run().await {
        let msg = match e.chain().find_map(|cause| cause.downcast_ref::<FlowError>()) {
            Some(flow) => format!("[{}] {e:#}", flow.kind()),
            None => format!("{e:#}"),
        };
        print_error(&msg);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let source = config::resolve_config_source(cli.config.as_deref());
    let mut cfg = config::load_config(&source)?;
    cfg.credentials.merge_overrides(
        cli.client_id.as_deref(),
        cli.client_secret.as_deref(),
        cli.redirect_uri.as_deref(),
    );
    if cli.sandbox {
        cfg.oauth.environment = Environment::Sandbox;
    }

    observability::init_tracing_with_level(&cfg.logging.level);
    tracing::debug!(source = %source, environment = %cfg.oauth.environment, "Configuration loaded");

    match &cli.command {
        Commands::AuthorizeUrl(args) => {
            let client = oauth_client(&cfg)?;
            commands::authorize::authorize_url(&client, &cfg.credentials, args, format)?;
        }
        Commands::ParseRedirect(args) => {
            commands::authorize::parse(args, format)?;
        }
        Commands::Exchange(args) => {
            let client = oauth_client(&cfg)?;
            let credentials = cfg.credentials.to_client_credentials()?;
            commands::token::exchange(&client, &credentials, args, format).await?;
        }
        Commands::Refresh(args) => {
            let client = oauth_client(&cfg)?;
            let credentials = cfg.credentials.to_client_credentials()?;
            commands::token::refresh(&client, &credentials, args, format).await?;
        }
        Commands::Call(args) => {
            let client = AccountingClient::new(cfg.oauth.clone())
                .context("Failed to create accounting API client")?;
            commands::api::call(&client, args, format).await?;
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => commands::config::show(&cfg, &source)?,
        },
    }

    Ok(())
}

fn oauth_client(cfg: &AppConfig) -> Result<OAuthClient> {
    OAuthClient::new(cfg.oauth.clone()).context("Failed to create OAuth client")
}
