//! # Configuration Settings
//!
//! Settings for the encryption endpoint client and for logging.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::errors::{KmsplaneError, Result};
use crate::secrets::SecretString;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Encryption endpoint client configuration
    #[validate(nested)]
    pub client: ClientSettings,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(KmsplaneError::from)
    }
}

/// Client configuration for the tenant encryption endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the management API (e.g. `https://console.example.com:9443`)
    #[validate(custom(function = "validate_base_url"))]
    pub base_url: String,

    /// Bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Log request and response bodies at trace level
    pub verbose: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            token: None,
            timeout_seconds: 30,
            verbose: false,
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn validate_base_url(value: &str) -> std::result::Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => {
            let mut error = ValidationError::new("base_url");
            error.message = Some("Base URL must be an http or https URL".into());
            Err(error)
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            service_name: "kmsplane".to_string(),
        }
    }
}
