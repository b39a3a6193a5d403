//! Encryption configuration as reported by the backend for one tenant.
//!
//! Provider blocks arrive with their full field values. Certificates arrive as
//! stored handles only; key material is write-only and never echoed back.

use serde::{Deserialize, Serialize};

use super::certificate::CertificateInfo;
use super::draft::PodSecurityDraft;
use super::provider::{AwsConfig, AzureConfig, GcpConfig, GemaltoConfig, KmsProvider, VaultConfig};
use super::text::lenient_text;

/// Stored handles of the KMS mTLS identity and CA
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmsMtlsInfo {
    pub crt: Option<CertificateInfo>,
    pub ca: Option<CertificateInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantEncryptionInfo {
    /// Raw configuration document text of the encryption server
    pub raw: String,
    pub image: String,
    #[serde(deserialize_with = "lenient_text")]
    pub replicas: String,
    pub security_context: Option<PodSecurityDraft>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemalto: Option<GemaltoConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureConfig>,

    #[serde(rename = "server_tls", skip_serializing_if = "Option::is_none")]
    pub server_tls: Option<CertificateInfo>,
    #[serde(rename = "minio_mtls", skip_serializing_if = "Option::is_none")]
    pub minio_mtls: Option<CertificateInfo>,
    #[serde(rename = "kms_mtls", skip_serializing_if = "Option::is_none")]
    pub kms_mtls: Option<KmsMtlsInfo>,

    /// KMS policies, kept for display only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<serde_json::Value>,
}

impl TenantEncryptionInfo {
    /// Active provider, taking the first block present in precedence order
    pub fn active_provider(&self) -> Option<KmsProvider> {
        KmsProvider::ALL.into_iter().find(|provider| match provider {
            KmsProvider::Vault => self.vault.is_some(),
            KmsProvider::Aws => self.aws.is_some(),
            KmsProvider::Gemalto => self.gemalto.is_some(),
            KmsProvider::Gcp => self.gcp.is_some(),
            KmsProvider::Azure => self.azure.is_some(),
        })
    }

    /// Encryption is enabled exactly when a provider block is present
    pub fn is_enabled(&self) -> bool {
        self.active_provider().is_some()
    }

    pub fn has_certificates(&self) -> bool {
        self.server_tls.is_some()
            || self.minio_mtls.is_some()
            || self
                .kms_mtls
                .as_ref()
                .is_some_and(|kms| kms.crt.is_some() || kms.ca.is_some())
    }
}
