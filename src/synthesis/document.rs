//! Wire documents sent to the tenant encryption endpoint.
//!
//! Field names match what the backend expects in the request body. Secret
//! fields are written in clear here and only here.

use serde::Serialize;

use crate::domain::FsGroupChangePolicy;
use crate::secrets::{expose, SecretString};

/// Body of the update request when encryption stays enabled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDocument {
    /// Raw override text; empty unless raw-edit mode is active
    pub raw: String,
    #[serde(rename = "secretsToBeDeleted")]
    pub secrets_to_be_deleted: Vec<String>,
    pub replicas: i64,
    #[serde(rename = "securityContext")]
    pub security_context: SecurityContextDocument,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_tls: Option<KeyPairDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minio_mtls: Option<KeyPairDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_mtls: Option<KmsMtlsDocument>,
    #[serde(flatten)]
    pub provider: ProviderDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContextDocument {
    pub run_as_user: i64,
    pub run_as_group: i64,
    pub fs_group: i64,
    pub run_as_non_root: bool,
    pub fs_group_change_policy: FsGroupChangePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPairDocument {
    #[serde(serialize_with = "expose")]
    pub key: SecretString,
    pub crt: String,
}

/// KMS mTLS pair and CA; either half may be missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KmsMtlsDocument {
    #[serde(flatten)]
    pub pair: Option<KeyPairDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
}

/// Exactly one provider block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderDocument {
    Vault(VaultDocument),
    Aws(AwsDocument),
    Gemalto(GemaltoDocument),
    Gcp(GcpDocument),
    Azure(AzureDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultDocument {
    pub endpoint: String,
    pub engine: String,
    pub namespace: String,
    pub prefix: String,
    pub approle: VaultAppRoleDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VaultStatusDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultAppRoleDocument {
    pub engine: String,
    #[serde(serialize_with = "expose")]
    pub id: SecretString,
    #[serde(serialize_with = "expose")]
    pub secret: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultStatusDocument {
    pub ping: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwsDocument {
    pub secretsmanager: AwsSecretsManagerDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwsSecretsManagerDocument {
    pub endpoint: String,
    pub region: String,
    pub kmskey: String,
    pub credentials: AwsCredentialsDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwsCredentialsDocument {
    pub accesskey: String,
    #[serde(serialize_with = "expose")]
    pub secretkey: SecretString,
    #[serde(serialize_with = "expose")]
    pub token: SecretString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GemaltoDocument {
    pub keysecure: GemaltoKeySecureDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GemaltoKeySecureDocument {
    pub endpoint: String,
    pub credentials: GemaltoCredentialsDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GemaltoCredentialsDocument {
    #[serde(serialize_with = "expose")]
    pub token: SecretString,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcpDocument {
    pub secretmanager: GcpSecretManagerDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcpSecretManagerDocument {
    pub project_id: String,
    pub endpoint: String,
    pub credentials: GcpCredentialsDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcpCredentialsDocument {
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    #[serde(serialize_with = "expose")]
    pub private_key: SecretString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzureDocument {
    pub keyvault: AzureKeyVaultDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzureKeyVaultDocument {
    pub endpoint: String,
    pub credentials: AzureCredentialsDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzureCredentialsDocument {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(serialize_with = "expose")]
    pub client_secret: SecretString,
}

/// Body of the delete request when encryption is switched off
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisableDirective {
    #[serde(rename = "secretsToBeDeleted")]
    pub secrets_to_be_deleted: Vec<String>,
}

/// Outcome of synthesis: one request to send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EncryptionUpdate {
    /// PUT the configuration document
    Apply(ConfigDocument),
    /// DELETE the encryption configuration
    Disable(DisableDirective),
}

impl EncryptionUpdate {
    pub fn document(&self) -> Option<&ConfigDocument> {
        match self {
            Self::Apply(document) => Some(document),
            Self::Disable(_) => None,
        }
    }

    pub fn secrets_to_be_deleted(&self) -> &[String] {
        match self {
            Self::Apply(document) => &document.secrets_to_be_deleted,
            Self::Disable(directive) => &directive.secrets_to_be_deleted,
        }
    }

    pub fn is_disable(&self) -> bool {
        matches!(self, Self::Disable(_))
    }

    /// Provider block carried by the update, if any
    pub fn provider(&self) -> Option<&ProviderDocument> {
        self.document().map(|document| &document.provider)
    }
}
