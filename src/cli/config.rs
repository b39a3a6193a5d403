//! Settings resolution for the CLI
//!
//! Combines the layered [`AppConfig`] with command line overrides.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::client::ClientConfig;
use crate::config::AppConfig;
use crate::secrets::SecretString;

/// Command line overrides for client settings
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
    pub verbose: bool,
}

/// Load settings from the optional file and the environment
pub fn load_settings(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load kmsplane configuration")
}

/// Resolve the bearer token.
///
/// Priority order:
/// 1. --token command line flag
/// 2. --token-file command line flag
/// 3. `client.token` from the settings file or `KMSPLANE__CLIENT__TOKEN`
pub fn resolve_token(
    token_flag: Option<String>,
    token_file_flag: Option<&Path>,
    settings: &AppConfig,
) -> Result<SecretString> {
    if let Some(token) = token_flag {
        debug!("Using token from --token flag");
        return Ok(SecretString::new(token));
    }

    if let Some(token_file) = token_file_flag {
        debug!("Reading token from file: {}", token_file.display());
        let token = std::fs::read_to_string(token_file)
            .with_context(|| format!("Failed to read token file: {}", token_file.display()))?;
        return Ok(SecretString::new(token.trim()));
    }

    match &settings.client.token {
        Some(token) if !token.is_blank() => {
            debug!("Using token from settings");
            Ok(token.clone())
        }
        _ => anyhow::bail!(
            "No authentication token found. Use --token, --token-file or set KMSPLANE__CLIENT__TOKEN"
        ),
    }
}

/// Build the HTTP client configuration from settings and overrides
pub fn client_config(overrides: ClientOverrides, settings: &AppConfig) -> Result<ClientConfig> {
    let token = resolve_token(overrides.token, overrides.token_file.as_deref(), settings)?;

    let mut config = ClientConfig::from(&settings.client);
    config.token = token;
    if let Some(base_url) = overrides.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = overrides.timeout {
        config.timeout = std::time::Duration::from_secs(timeout);
    }
    config.verbose = config.verbose || overrides.verbose;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flag_wins() {
        let mut settings = AppConfig::default();
        settings.client.token = Some(SecretString::new("from-settings"));

        let token = resolve_token(Some("from-flag".to_string()), None, &settings).unwrap();
        assert_eq!(token.expose_secret(), "from-flag");
    }

    #[test]
    fn test_token_file_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  file-token  ").unwrap();

        let token = resolve_token(None, Some(file.path()), &AppConfig::default()).unwrap();
        assert_eq!(token.expose_secret(), "file-token");
    }

    #[test]
    fn test_missing_token() {
        assert!(resolve_token(None, None, &AppConfig::default()).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let mut settings = AppConfig::default();
        settings.client.token = Some(SecretString::new("pat"));

        let config = client_config(
            ClientOverrides {
                base_url: Some("https://console.local".to_string()),
                timeout: Some(7),
                verbose: true,
                ..ClientOverrides::default()
            },
            &settings,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://console.local");
        assert_eq!(config.timeout, std::time::Duration::from_secs(7));
        assert!(config.verbose);
        assert_eq!(config.token.expose_secret(), "pat");
    }
}
