//! OAuth commands
//!
//! The CLI has no redirect endpoint: `auth url` prints the consent URL and
//! the code from the redirect is pasted back with `auth code`.

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::counter::{CounterService, Notice, NoticeLevel};
use crate::interfaces::cli::CliError;

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Status => println!("  {} {}", "✓".green(), notice.message),
            NoticeLevel::Warning => println!("  {} {}", "!".yellow(), notice.message),
            NoticeLevel::Error => println!("  {} {}", "✗".red(), notice.message.red()),
        }
    }
}

pub async fn print_url(service: &Arc<CounterService>) -> Result<(), CliError> {
    let settings = service.load_settings().await?;
    if !settings.has_client_credentials() {
        return Err(CliError::CommandError(
            "client_id, client_secret and redirect_uri must be configured first".to_string(),
        ));
    }

    let url = service.begin_authentication().await?;
    println!("{}", "Open this URL in a browser and grant access:".bold());
    println!("  {}", url.as_str().blue());
    println!(
        "Then run {} with the code from the redirect.",
        "gacounter auth code <CODE>".cyan()
    );
    Ok(())
}

pub async fn exchange_code(service: &Arc<CounterService>, code: &str) -> Result<(), CliError> {
    let authenticated = service
        .auth_callback(code.trim(), Utc::now().timestamp())
        .await?;
    print_notices(service.notices().drain());

    if authenticated {
        println!("{} Authenticated", "✓".bold().green());
        Ok(())
    } else {
        Err(CliError::CommandError(
            "Authentication failed, no access token was issued".to_string(),
        ))
    }
}

pub async fn revoke(service: &Arc<CounterService>, yes: bool) -> Result<(), CliError> {
    if !yes {
        println!(
            "{} This clears tokens, client credentials and fetch progress. Re-run with {}.",
            "!".bold().yellow(),
            "--yes".cyan()
        );
        return Ok(());
    }

    service.revoke().await?;
    print_notices(service.notices().drain());
    println!("{} Authentication revoked", "✓".bold().green());
    Ok(())
}
