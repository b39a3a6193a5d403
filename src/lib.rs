//! # kmsplane
//!
//! Client-side model of a MinIO tenant's KES/KMS encryption configuration:
//! a typed draft per KMS provider, a pure validator, a pure synthesizer that
//! turns a valid draft into the update request, and a session that loads,
//! edits and submits drafts against the tenant's encryption endpoint.
//!
//! ## Architecture
//!
//! ```text
//! TenantEncryptionInfo → EncryptionDraft → validate() → synthesize() → EncryptionUpdate
//!          ↑                    ↑                                          ↓
//!          └──────────── ConfigurationSession ──── EncryptionTransport ────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kmsplane::client::{ClientConfig, EncryptionClient};
//! use kmsplane::session::{ConfigurationSession, TenantRef};
//! use kmsplane::domain::KmsProvider;
//!
//! #[tokio::main]
//! async fn main() -> kmsplane::Result<()> {
//!     let client = EncryptionClient::new(ClientConfig::default())?;
//!     let session = ConfigurationSession::new(TenantRef::new("tenant-ns", "storage"), Arc::new(client));
//!
//!     session.load().await?;
//!     session.set_provider(KmsProvider::Gcp);
//!     session.submit().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod session;
pub mod synthesis;
pub mod validation;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use domain::{EncryptionDraft, FieldId, KmsProvider, TenantEncryptionInfo};
pub use errors::{KmsplaneError, Result};
pub use session::{ConfigurationSession, EncryptionTransport, TenantRef};
pub use synthesis::{synthesize, EncryptionUpdate};
pub use validation::{validate, ValidationResult};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
