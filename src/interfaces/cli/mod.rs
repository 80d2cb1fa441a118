//! CLI interface module
//!
//! Every command except `config generate` opens the database, so the CLI
//! works whether or not a server is running against the same database.

pub mod commands;

use std::fmt;

use crate::cli::{AuthCommands, Commands, ConfigCommands, QueueCommands};
use crate::config::get_config;
use crate::runtime::lifetime::startup::{StartupContext, prepare_startup};
use commands::{auth, config_gen, jobs, queue, status};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::CounterError> for CliError {
    fn from(err: crate::errors::CounterError) -> Self {
        use crate::errors::CounterError;
        match err {
            CounterError::DatabaseConfig(_)
            | CounterError::DatabaseConnection(_)
            | CounterError::DatabaseOperation(_) => CliError::StorageError(err.format_simple()),
            CounterError::Serialization(_) | CounterError::Validation(_) => {
                CliError::ParseError(err.format_simple())
            }
            _ => CliError::CommandError(err.format_simple()),
        }
    }
}

async fn open() -> Result<StartupContext, CliError> {
    let config = get_config();
    prepare_startup(&config)
        .await
        .map_err(|e| CliError::StorageError(format!("{:#}", e)))
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generate doesn't need DB connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_gen::config_generate(output_path, force).await;
    }

    let ctx = open().await?;

    match cmd {
        Commands::Cron { force } => jobs::run_cron(&ctx.driver, force).await,
        Commands::Fetch { index } => jobs::fetch(&ctx.service, index).await,
        Commands::Count { nid } => jobs::count(&ctx.service, nid).await,
        Commands::Status { json } => status::show_status(&ctx.service, json).await,
        Commands::Auth { action } => match action {
            AuthCommands::Url => auth::print_url(&ctx.service).await,
            AuthCommands::Code { code } => auth::exchange_code(&ctx.service, &code).await,
            AuthCommands::Revoke { yes } => auth::revoke(&ctx.service, yes).await,
        },
        Commands::Queue { action } => match action {
            QueueCommands::Purge => queue::purge(&ctx.driver).await,
        },
        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server runtime".to_string(),
        )),
        Commands::Config { .. } => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CounterError;

    #[test]
    fn test_counter_error_mapping() {
        let err: CliError = CounterError::database_operation("locked").into();
        assert!(matches!(err, CliError::StorageError(_)));

        let err: CliError = CounterError::validation("bad chunk").into();
        assert!(matches!(err, CliError::ParseError(_)));

        let err: CliError = CounterError::authentication("no token").into();
        assert!(matches!(err, CliError::CommandError(ref m) if m.contains("no token")));
    }

    #[test]
    fn test_format_simple() {
        let err = CliError::CommandError("boom".to_string());
        assert_eq!(err.format_simple(), "Command error: boom");
        assert_eq!(err.to_string(), "Command error: boom");
    }
}
