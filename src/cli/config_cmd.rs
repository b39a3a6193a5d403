//! Settings file CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use super::output;
use crate::config::AppConfig;

/// Default settings file name, resolved against the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "kmsplane.toml";

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a settings file with default values
    Init {
        /// Destination path
        #[arg(long, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective settings after file and environment layering
    Show {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml", value_parser = ["json", "yaml"])]
        output: String,
    },
}

pub fn handle_config_command(command: ConfigCommands, settings: &AppConfig) -> Result<()> {
    match command {
        ConfigCommands::Init { path, force } => init_config(&path, force)?,
        ConfigCommands::Show { output } => output::print_output(settings, &output)?,
    }

    Ok(())
}

/// Serialize default settings as TOML
pub fn default_settings_toml() -> Result<String> {
    toml::to_string_pretty(&AppConfig::default()).context("Failed to serialize configuration")
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let contents = default_settings_toml()?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Configuration file created at: {}", path.display());
    println!("\nThe token is best supplied through the environment:");
    println!("  export KMSPLANE__CLIENT__TOKEN=<your-token>");

    Ok(())
}
