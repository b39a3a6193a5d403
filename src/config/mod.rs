//! # Configuration Management
//!
//! Settings are layered with the `config` crate:
//!
//! 1. built-in defaults
//! 2. an optional file (TOML, YAML or JSON, chosen by extension)
//! 3. environment variables such as `KMSPLANE__CLIENT__BASE_URL`
//!
//! The merged result is validated before it is returned.

pub mod settings;

pub use settings::{AppConfig, ClientSettings, ObservabilityConfig};

use config::{Config, Environment, File};
use std::path::Path;
use tracing::debug;

use crate::errors::{KmsplaneError, Result};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "KMSPLANE";

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(KmsplaneError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path));
        }

        let config: AppConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults and the environment only
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }
}
