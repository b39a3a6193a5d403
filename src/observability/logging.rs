//! # Structured Logging
//!
//! Subscriber initialisation and span macros for session and transport
//! operations. Every span carries a fresh `request_id` so the load, submit and
//! reload belonging to one user action can be correlated in JSON output.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Create a span for a configuration session operation.
///
/// ```rust,ignore
/// let span = session_span!("load", tenant);
/// let span = session_span!("submit", tenant, generation = 3);
/// ```
#[macro_export]
macro_rules! session_span {
    ($operation:expr, $tenant:expr) => {
        tracing::info_span!(
            "session_operation",
            operation = %$operation,
            namespace = %$tenant.namespace,
            tenant = %$tenant.name,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $tenant:expr, $($field:tt)*) => {
        tracing::info_span!(
            "session_operation",
            operation = %$operation,
            namespace = %$tenant.namespace,
            tenant = %$tenant.name,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a span for a request against the encryption endpoint
#[macro_export]
macro_rules! transport_span {
    ($method:expr, $path:expr) => {
        tracing::debug_span!(
            "encryption_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "encryption_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this when a subscriber
/// is already installed (tests, embedding applications) is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        // Subscriber already set elsewhere; ignore.
    }
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::debug!(
        service_name = %config.observability.service_name,
        base_url = %config.client.base_url,
        timeout_seconds = config.client.timeout_seconds,
        token_configured = config.client.token.is_some(),
        json_logging = config.observability.json_logging,
        "kmsplane configuration"
    );
}

#[cfg(test)]
mod tests {
    use crate::session::TenantRef;

    #[test]
    fn test_macros_compile() {
        let tenant = TenantRef::new("tenant-ns", "storage-lite");
        let _span = session_span!("load", tenant);
        let _span = session_span!("submit", tenant, generation = 2u64);
        let _span = transport_span!("GET", "/api/v1/namespaces/ns/tenants/t/encryption");
        let _span = transport_span!("PUT", "/encryption", provider = "vault");
    }
}
