use anyhow::Result;
use colored::Colorize;

use crate::config::{AppConfig, ConfigSource};

pub fn show(cfg: &AppConfig, source: &ConfigSource) -> Result<()> {
    let display = AppConfig {
        credentials: cfg.credentials.masked(),
        ..cfg.clone()
    };
    let endpoints = cfg.oauth.endpoints()?;

    println!("{}: {}", "Source".cyan(), source);
    println!("{}: {}", "Environment".cyan(), cfg.oauth.environment);
    println!("{}: {}", "Authorization endpoint".cyan(), endpoints.authorization_endpoint);
    println!("{}: {}", "Token endpoint".cyan(), endpoints.token_endpoint);
    println!("{}: {}", "API base".cyan(), endpoints.api_base_url);
    println!();
    println!("{}", toml::to_string_pretty(&display)?);
    Ok(())
}
