use anyhow::{Context, Result};
use colored::Colorize;
use qbo_oauth::{AuthorizationRequest, OAuthClient, parse_redirect};

use crate::cli::{AuthorizeUrlArgs, OutputFormat, ParseRedirectArgs};
use crate::config::CredentialsConfig;
use crate::output::{print_authorization_url, print_redirect, print_success};

pub fn authorize_url(
    client: &OAuthClient,
    credentials: &CredentialsConfig,
    args: &AuthorizeUrlArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut request =
        AuthorizationRequest::new(credentials.client_id()?, credentials.redirect_uri()?);
    if !args.scopes.is_empty() {
        request = request.with_scopes(&args.scopes);
    }
    if let Some(state) = &args.state {
        request = request.with_state(state);
    }

    let auth_url = client
        .authorization_url(&request)
        .context("Failed to build authorization URL")?;

    print_authorization_url(&auth_url, format)?;
    if matches!(format, OutputFormat::Table) {
        println!(
            "Keep the state; pass it as {} when exchanging the redirect.",
            "--expect-state".cyan()
        );
    }
    Ok(())
}

pub fn parse(args: &ParseRedirectArgs, format: OutputFormat) -> Result<()> {
    let redirect = parse_redirect(&args.url).context("Failed to parse redirect URL")?;
    if let Some(expected) = &args.expect_state {
        redirect.verify_state(expected)?;
    }

    print_redirect(&redirect, format)?;
    if args.expect_state.is_some() && matches!(format, OutputFormat::Table) {
        print_success("State matches");
    }
    Ok(())
}
