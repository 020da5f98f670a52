use anyhow::{Context, Result};
use colored::Colorize;
use qbo_oauth::{ClientCredentials, OAuthClient, parse_redirect};
use time::OffsetDateTime;

use crate::cli::{ExchangeArgs, OutputFormat, RefreshArgs};
use crate::output::{print_success, print_tokens};

pub async fn exchange(
    client: &OAuthClient,
    credentials: &ClientCredentials,
    args: &ExchangeArgs,
    format: OutputFormat,
) -> Result<()> {
    let issued_at = OffsetDateTime::now_utc();

    let (tokens, realm_id) = match (&args.code, &args.redirect_url, &args.expect_state) {
        (Some(code), _, _) => (client.exchange_code(code, credentials).await?, None),
        (None, Some(redirect_url), Some(expected)) => {
            let (redirect, tokens) = client
                .exchange_redirect(redirect_url, expected, credentials)
                .await?;
            (tokens, redirect.realm_id)
        }
        (None, Some(redirect_url), None) => {
            let redirect = parse_redirect(redirect_url).context("Failed to parse redirect URL")?;
            tracing::warn!("No --expect-state given; the redirect state was not checked");
            let tokens = client.exchange_code(&redirect.code, credentials).await?;
            (tokens, redirect.realm_id)
        }
        (None, None, _) => anyhow::bail!("Either --code or --redirect-url is required"),
    };

    print_success("Authorization code exchanged");
    print_tokens(&tokens, realm_id.as_deref(), issued_at, format)
}

pub async fn refresh(
    client: &OAuthClient,
    credentials: &ClientCredentials,
    args: &RefreshArgs,
    format: OutputFormat,
) -> Result<()> {
    let issued_at = OffsetDateTime::now_utc();
    let tokens = client
        .refresh_token(&args.refresh_token, credentials)
        .await?;

    if tokens.refresh_token != args.refresh_token {
        println!(
            "{} the refresh token was rotated; store the new one",
            "Note:".yellow().bold()
        );
    }
    print_success("Access token refreshed");
    print_tokens(&tokens, None, issued_at, format)
}

