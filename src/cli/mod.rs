//! # Command Line Interface
//!
//! Offline validation and rendering of encryption drafts, and load/apply/disable
//! against a tenant's encryption endpoint via the HTTP client.

pub mod config;
pub mod config_cmd;
pub mod encryption;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::{init_logging, log_config_info};
use encryption::EncryptionCommands;

#[derive(Parser)]
#[command(name = "kmsplane")]
#[command(about = "Tenant KMS encryption configuration tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bearer token for API authentication
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to file containing the bearer token
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Base URL of the management API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Encryption(EncryptionCommands),

    /// Settings file management commands
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if cli.verbose {
        settings.observability.log_level = "debug".to_string();
    }
    init_logging(&settings.observability);
    log_config_info(&settings);

    match cli.command {
        Commands::Encryption(command) => {
            let client = if command.is_remote() {
                let overrides = config::ClientOverrides {
                    token: cli.token,
                    token_file: cli.token_file,
                    base_url: cli.base_url,
                    timeout: cli.timeout,
                    verbose: cli.verbose,
                };
                Some(config::client_config(overrides, &settings)?)
            } else {
                None
            };
            encryption::handle_encryption_command(command, client).await?
        }
        Commands::Config { command } => config_cmd::handle_config_command(command, &settings)?,
    }

    Ok(())
}

/// Load a `.env` file if present; must run before settings are read
fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }
}
