//! Boundary between the session and the service that persists configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::TenantEncryptionInfo;
use crate::errors::Result;
use crate::synthesis::{ConfigDocument, DisableDirective};

/// Stable address of a tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantRef {
    pub namespace: String,
    pub name: String,
}

impl TenantRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for TenantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Fetch and persist the encryption configuration of a tenant.
///
/// Failures are reported as [`KmsplaneError::Transport`](crate::errors::KmsplaneError::Transport).
#[async_trait]
pub trait EncryptionTransport: Send + Sync + fmt::Debug {
    /// Current configuration of the tenant
    async fn fetch(&self, tenant: &TenantRef) -> Result<TenantEncryptionInfo>;

    /// Persist a configuration document (encryption enabled)
    async fn apply(&self, tenant: &TenantRef, document: &ConfigDocument) -> Result<()>;

    /// Remove the encryption configuration (encryption disabled)
    async fn disable(&self, tenant: &TenantRef, directive: &DisableDirective) -> Result<()>;
}
