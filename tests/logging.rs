//! Global subscriber installation
//!
//! Runs in its own test binary: installing the global subscriber would
//! otherwise race the `#[traced_test]` unit tests.

use kmsplane::config::{AppConfig, ObservabilityConfig};
use kmsplane::observability::{init_logging, log_config_info};

#[test]
fn test_init_logging_twice_is_harmless() {
    let config = ObservabilityConfig { json_logging: true, ..ObservabilityConfig::default() };

    init_logging(&config);
    init_logging(&config);
    log_config_info(&AppConfig::default());

    tracing::info!("logging initialised");
}
