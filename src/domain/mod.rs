//! Domain layer
//!
//! Pure types for tenant encryption configuration with no transport
//! dependencies. Everything here can be exercised without a backend.
//!
//! ## Module Organization
//!
//! - `provider`: KMS provider selection, per-provider field bags and schemas
//! - `certificate`: the certificate slot model and the removal set
//! - `draft`: the editable [`EncryptionDraft`] aggregate
//! - `baseline`: the configuration fetched from the backend
//! - `text`: text-to-integer coercion shared by drafts and synthesis

pub mod baseline;
pub mod certificate;
pub mod draft;
pub mod provider;
pub mod text;

pub use baseline::{KmsMtlsInfo, TenantEncryptionInfo};
pub use certificate::{
    CertificateInfo, CertificateSlot, CertificateSlots, PendingCertificate, RemovalSet, SlotKind,
};
pub use draft::{EditMode, EncryptionDraft, FsGroupChangePolicy, PodSecurityDraft};
pub use provider::{
    schema_for, AwsConfig, AwsCredentials, AwsSecretsManager, AzureConfig, AzureCredentials,
    AzureKeyVault, Constraint, FieldId, FieldRule, GcpConfig, GcpCredentials, GcpSecretManager,
    GemaltoConfig, GemaltoCredentials, GemaltoKeySecure, KmsProvider, ProviderConfigs,
    ProviderSchema, VaultAppRole, VaultConfig, VaultStatus,
};
