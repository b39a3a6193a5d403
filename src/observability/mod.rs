//! # Observability
//!
//! Structured logging for kmsplane. Spans and events use `tracing`; output is
//! plain text or JSON depending on [`ObservabilityConfig`](crate::config::ObservabilityConfig).

pub mod logging;

pub use logging::{init_logging, log_config_info};
