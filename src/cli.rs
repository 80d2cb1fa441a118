//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for gacounter using clap's derive macros.

use clap::{Parser, Subcommand};

/// gacounter - analytics pageview counter service
#[derive(Parser)]
#[command(name = "gacounter")]
#[command(version)]
#[command(about = "Polls an analytics reporting API and serves pageview counts", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Run one cron pass: queue fetch/count jobs and process the queue
    Cron {
        /// Ignore the cron interval gate
        #[arg(long)]
        force: bool,
    },

    /// Fetch one page of analytics data at the given cursor index
    Fetch {
        #[arg(long)]
        index: u64,
    },

    /// Recompute the pageview total of one content item
    Count {
        #[arg(long)]
        nid: i64,
    },

    /// Show counter status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// OAuth authentication
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },

    /// Job queue maintenance
    Queue {
        #[command(subcommand)]
        action: QueueCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Print the provider authorization URL
    Url,

    /// Exchange an authorization code for tokens
    Code {
        /// Code returned to the redirect URI
        code: String,
    },

    /// Revoke authentication and clear stored credentials
    Revoke {
        /// Confirm the revocation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Delete all queued jobs
    Purge,
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
