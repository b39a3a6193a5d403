//! # Error Types
//!
//! Error types for encryption configuration loading, synthesis and submission.

use crate::domain::SlotKind;

/// Custom result type for kmsplane operations
pub type Result<T> = std::result::Result<T, KmsplaneError>;

/// Main error type for kmsplane
#[derive(thiserror::Error, Debug)]
pub enum KmsplaneError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// YAML serialization/deserialization errors
    #[error("YAML error: {context}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
        context: String,
    },

    /// Validation errors outside the draft (settings, documents)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Load or submit failed at the service boundary
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// Synthesis was invoked on a draft that does not validate.
    ///
    /// This is an integration bug, never a user-recoverable condition.
    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    /// Illegal certificate slot transition
    #[error("Certificate slot {slot}: {message}")]
    CertificateSlot { slot: SlotKind, message: String },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl KmsplaneError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a transport error without a status code (connection, decode)
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport { message: message.into(), status: None }
    }

    /// Create a transport error from a non-success HTTP status
    pub fn transport_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Transport { message: message.into(), status: Some(status) }
    }

    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Self::Precondition { message: message.into() }
    }

    pub fn certificate_slot<S: Into<String>>(slot: SlotKind, message: S) -> Self {
        Self::CertificateSlot { slot, message: message.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Add context to an error
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        let context = context.into();
        match &mut self {
            KmsplaneError::Io { context: ctx, .. }
            | KmsplaneError::Serialization { context: ctx, .. }
            | KmsplaneError::Yaml { context: ctx, .. } => {
                *ctx = format!("{}: {}", context, ctx);
            }
            KmsplaneError::Transport { message, .. } => {
                *message = format!("{}: {}", context, message);
            }
            _ => {}
        }
        self
    }

    /// HTTP-style status code used when reporting this error
    pub fn status_code(&self) -> u16 {
        match self {
            KmsplaneError::Config { .. } => 500,
            KmsplaneError::Io { .. } => 500,
            KmsplaneError::Serialization { .. } => 400,
            KmsplaneError::Yaml { .. } => 400,
            KmsplaneError::Validation { .. } => 400,
            KmsplaneError::Transport { status, .. } => status.unwrap_or(502),
            KmsplaneError::Precondition { .. } => 500,
            KmsplaneError::CertificateSlot { .. } => 409,
            KmsplaneError::Internal { .. } => 500,
        }
    }

    /// Whether re-triggering the same operation could succeed.
    ///
    /// Nothing in this crate retries automatically; the flag is for callers
    /// deciding how to word a notification.
    pub fn is_retryable(&self) -> bool {
        match self {
            KmsplaneError::Transport { status: None, .. } => true,
            KmsplaneError::Transport { status: Some(status), .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            KmsplaneError::Io { .. } => true,
            _ => false,
        }
    }

    /// True for failures at the load/submit service boundary
    pub fn is_transport(&self) -> bool {
        matches!(self, KmsplaneError::Transport { .. })
    }
}

impl From<std::io::Error> for KmsplaneError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for KmsplaneError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<serde_yaml::Error> for KmsplaneError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Yaml { source: error, context: "YAML serialization failed".to_string() }
    }
}

impl From<config::ConfigError> for KmsplaneError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<reqwest::Error> for KmsplaneError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => Self::transport_status(error.to_string(), status.as_u16()),
            None => Self::transport(error.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for KmsplaneError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_errors("", &errors, &mut fields);
        fields.sort();

        Self::validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

/// Flatten nested validation errors into `path: message` entries
fn collect_validation_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
