use anyhow::Result;
use colored::Colorize;
use qbo_oauth::{AuthorizationUrl, RedirectResult, TokenResponse};
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            print_as_table(value);
            Ok(())
        }
    }
}

pub fn print_authorization_url(auth_url: &AuthorizationUrl, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "url": auth_url.as_str(),
            "state": auth_url.state,
        })),
        OutputFormat::Table => {
            println!("{}", "Open this URL in a browser:".cyan());
            println!("{auth_url}");
            println!("{}: {}", "State".cyan(), auth_url.state);
            Ok(())
        }
    }
}

pub fn print_redirect(redirect: &RedirectResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(redirect)?),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            builder.push_record(["code", redirect.code.as_str()]);
            builder.push_record(["realm_id", redirect.realm_id.as_deref().unwrap_or("-")]);
            builder.push_record(["state", redirect.state.as_str()]);
            println!("{}", builder.build().with(Style::rounded()));
            Ok(())
        }
    }
}

/// Prints a token response with absolute expiry instants.
///
/// `realm_id` is included when the tokens came from a redirect.
pub fn print_tokens(
    tokens: &TokenResponse,
    realm_id: Option<&str>,
    issued_at: OffsetDateTime,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&token_document(tokens, realm_id, issued_at)?),
        OutputFormat::Table => {
            let access_expires = format_instant(tokens.access_token_expires_at(issued_at));
            let refresh_expires = tokens
                .refresh_token_expires_at(issued_at)
                .map(format_instant);
            let expires_in = tokens.expires_in.to_string();

            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            if let Some(realm_id) = realm_id {
                builder.push_record(["realm_id", realm_id]);
            }
            builder.push_record(["token_type", tokens.token_type.as_str()]);
            builder.push_record(["access_token", tokens.access_token.as_str()]);
            builder.push_record(["expires_in", expires_in.as_str()]);
            builder.push_record(["access_token_expires_at", access_expires.as_str()]);
            builder.push_record(["refresh_token", tokens.refresh_token.as_str()]);
            builder.push_record([
                "refresh_token_expires_at",
                refresh_expires.as_deref().unwrap_or("-"),
            ]);
            if let Some(id_token) = &tokens.id_token {
                builder.push_record(["id_token", id_token.as_str()]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            Ok(())
        }
    }
}

fn token_document(
    tokens: &TokenResponse,
    realm_id: Option<&str>,
    issued_at: OffsetDateTime,
) -> Result<Value> {
    let mut value = serde_json::to_value(tokens)?;
    if let Value::Object(map) = &mut value {
        if let Some(realm_id) = realm_id {
            map.insert("realm_id".into(), json!(realm_id));
        }
        map.insert(
            "access_token_expires_at".into(),
            json!(format_instant(tokens.access_token_expires_at(issued_at))),
        );
        if let Some(at) = tokens.refresh_token_expires_at(issued_at) {
            map.insert("refresh_token_expires_at".into(), json!(format_instant(at)));
        }
    }
    Ok(value)
}

fn format_instant(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

fn print_as_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.clone(), cell(val)]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
        other => println!("{}", cell(other)),
    }
}

// Nested values are shown as compact JSON.
fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
