//! KMS provider selection, field bags and schemas
//!
//! Each backend has one concrete field-bag struct. All five bags live side by
//! side in [`ProviderConfigs`] so that switching the active provider never
//! discards what was typed for another one; only the bag matching
//! [`KmsProvider`] is validated and synthesized.
//!
//! Field bags hold editor text. Numeric fields (`retry`, `ping`) stay as text
//! until synthesis, and credentials are [`SecretString`]s.
//!
//! The schema of each provider is a static table of [`FieldRule`]s keyed by
//! [`FieldId`], the stable identifier shared with the presentation layer.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::text::{is_blank, lenient_text, parse_integer};
use crate::secrets::SecretString;

/// Message for a required field that is missing or blank
pub const REQUIRED_MESSAGE: &str = "Field cannot be empty";

/// Message for an optional numeric field that is negative or not a number
pub const NON_NEGATIVE_MESSAGE: &str = "Value needs to be 0 or greater";

/// The KMS backend the encryption server talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KmsProvider {
    /// HashiCorp Vault K/V with AppRole authentication
    #[default]
    Vault,
    /// AWS Secrets Manager
    Aws,
    /// Thales Gemalto KeySecure
    Gemalto,
    /// GCP Secret Manager
    Gcp,
    /// Azure Key Vault
    Azure,
}

impl KmsProvider {
    /// Every provider, in the order the backend reports precedence
    pub const ALL: [KmsProvider; 5] = [
        KmsProvider::Vault,
        KmsProvider::Aws,
        KmsProvider::Gemalto,
        KmsProvider::Gcp,
        KmsProvider::Azure,
    ];

    /// Wire name, also the key of the provider block in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::Aws => "aws",
            Self::Gemalto => "gemalto",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
        }
    }
}

impl FromStr for KmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vault" => Ok(Self::Vault),
            "aws" => Ok(Self::Aws),
            "gemalto" => Ok(Self::Gemalto),
            "gcp" => Ok(Self::Gcp),
            "azure" => Ok(Self::Azure),
            _ => Err(format!("Unknown KMS provider: {}", s)),
        }
    }
}

impl fmt::Display for KmsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable identifier of an editable field.
///
/// The string form is the contract between the validator and the
/// presentation layer; it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Replicas,
    RunAsUser,
    RunAsGroup,
    FsGroup,
    ServerKey,
    ServerCert,
    ClientKey,
    ClientCert,
    KmsMtlsKey,
    KmsMtlsCert,
    KmsMtlsCa,
    VaultEndpoint,
    VaultEngine,
    VaultNamespace,
    VaultPrefix,
    VaultAppRoleEngine,
    VaultId,
    VaultSecret,
    VaultRetry,
    VaultPing,
    AwsEndpoint,
    AwsRegion,
    AwsKmsKey,
    AwsAccessKey,
    AwsSecretKey,
    AwsToken,
    GemaltoEndpoint,
    GemaltoToken,
    GemaltoDomain,
    GemaltoRetry,
    AzureEndpoint,
    AzureTenantId,
    AzureClientId,
    AzureClientSecret,
    GcpProjectId,
    GcpEndpoint,
    GcpClientEmail,
    GcpClientId,
    GcpPrivateKeyId,
    GcpPrivateKey,
}

impl FieldId {
    pub const ALL: [FieldId; 40] = [
        FieldId::Replicas,
        FieldId::RunAsUser,
        FieldId::RunAsGroup,
        FieldId::FsGroup,
        FieldId::ServerKey,
        FieldId::ServerCert,
        FieldId::ClientKey,
        FieldId::ClientCert,
        FieldId::KmsMtlsKey,
        FieldId::KmsMtlsCert,
        FieldId::KmsMtlsCa,
        FieldId::VaultEndpoint,
        FieldId::VaultEngine,
        FieldId::VaultNamespace,
        FieldId::VaultPrefix,
        FieldId::VaultAppRoleEngine,
        FieldId::VaultId,
        FieldId::VaultSecret,
        FieldId::VaultRetry,
        FieldId::VaultPing,
        FieldId::AwsEndpoint,
        FieldId::AwsRegion,
        FieldId::AwsKmsKey,
        FieldId::AwsAccessKey,
        FieldId::AwsSecretKey,
        FieldId::AwsToken,
        FieldId::GemaltoEndpoint,
        FieldId::GemaltoToken,
        FieldId::GemaltoDomain,
        FieldId::GemaltoRetry,
        FieldId::AzureEndpoint,
        FieldId::AzureTenantId,
        FieldId::AzureClientId,
        FieldId::AzureClientSecret,
        FieldId::GcpProjectId,
        FieldId::GcpEndpoint,
        FieldId::GcpClientEmail,
        FieldId::GcpClientId,
        FieldId::GcpPrivateKeyId,
        FieldId::GcpPrivateKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replicas => "replicas",
            Self::RunAsUser => "kes_securityContext_runAsUser",
            Self::RunAsGroup => "kes_securityContext_runAsGroup",
            Self::FsGroup => "kes_securityContext_fsGroup",
            Self::ServerKey => "serverKey",
            Self::ServerCert => "serverCert",
            Self::ClientKey => "clientKey",
            Self::ClientCert => "clientCert",
            Self::KmsMtlsKey => "kms_mtls_key",
            Self::KmsMtlsCert => "kms_mtls_cert",
            Self::KmsMtlsCa => "kms_mtls_ca",
            Self::VaultEndpoint => "vault_endpoint",
            Self::VaultEngine => "vault_engine",
            Self::VaultNamespace => "vault_namespace",
            Self::VaultPrefix => "vault_prefix",
            Self::VaultAppRoleEngine => "vault_approle_engine",
            Self::VaultId => "vault_id",
            Self::VaultSecret => "vault_secret",
            Self::VaultRetry => "vault_retry",
            Self::VaultPing => "vault_ping",
            Self::AwsEndpoint => "aws_endpoint",
            Self::AwsRegion => "aws_region",
            Self::AwsKmsKey => "aws_kmsKey",
            Self::AwsAccessKey => "aws_accessKey",
            Self::AwsSecretKey => "aws_secretKey",
            Self::AwsToken => "aws_token",
            Self::GemaltoEndpoint => "gemalto_endpoint",
            Self::GemaltoToken => "gemalto_token",
            Self::GemaltoDomain => "gemalto_domain",
            Self::GemaltoRetry => "gemalto_retry",
            Self::AzureEndpoint => "azure_endpoint",
            Self::AzureTenantId => "azure_tenant_id",
            Self::AzureClientId => "azure_client_id",
            Self::AzureClientSecret => "azure_client_secret",
            Self::GcpProjectId => "gcp_project_id",
            Self::GcpEndpoint => "gcp_endpoint",
            Self::GcpClientEmail => "gcp_client_email",
            Self::GcpClientId => "gcp_client_id",
            Self::GcpPrivateKeyId => "gcp_private_key_id",
            Self::GcpPrivateKey => "gcp_private_key",
        }
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown field identifier: {}", s))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Constraint a provider schema places on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Must be present and non-blank
    Required,
    /// Pass-through, never a source of violations
    Optional,
    /// Optional, but when present must be an integer ≥ 0
    NonNegative,
}

/// One row of a provider schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FieldId,
    /// Path of the field inside the provider block
    pub path: &'static str,
    pub constraint: Constraint,
}

impl FieldRule {
    pub const fn required(field: FieldId, path: &'static str) -> Self {
        Self { field, path, constraint: Constraint::Required }
    }

    pub const fn optional(field: FieldId, path: &'static str) -> Self {
        Self { field, path, constraint: Constraint::Optional }
    }

    pub const fn non_negative(field: FieldId, path: &'static str) -> Self {
        Self { field, path, constraint: Constraint::NonNegative }
    }

    /// Check a field value against this rule, returning the violation message.
    ///
    /// `None` stands for a field the bag does not carry.
    pub fn check(&self, value: Option<&str>) -> Option<&'static str> {
        match self.constraint {
            Constraint::Required => match value {
                Some(text) if !is_blank(text) => None,
                _ => Some(REQUIRED_MESSAGE),
            },
            Constraint::Optional => None,
            Constraint::NonNegative => match value {
                Some(text) if !is_blank(text) => match parse_integer(text) {
                    Some(number) if number >= 0 => None,
                    _ => Some(NON_NEGATIVE_MESSAGE),
                },
                _ => None,
            },
        }
    }
}

/// A provider field bag with a declared schema
pub trait ProviderSchema {
    const RULES: &'static [FieldRule];

    /// Current text of a field declared in [`Self::RULES`]
    fn field_value(&self, field: FieldId) -> Option<&str>;
}

/// Schema rows for a provider
pub fn schema_for(provider: KmsProvider) -> &'static [FieldRule] {
    match provider {
        KmsProvider::Vault => VaultConfig::RULES,
        KmsProvider::Aws => AwsConfig::RULES,
        KmsProvider::Gemalto => GemaltoConfig::RULES,
        KmsProvider::Gcp => GcpConfig::RULES,
        KmsProvider::Azure => AzureConfig::RULES,
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub endpoint: String,
    /// K/V engine path; the server defaults to `kv` when empty
    pub engine: String,
    pub namespace: String,
    /// Directory inside the K/V engine
    pub prefix: String,
    pub approle: VaultAppRole,
    pub status: VaultStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultAppRole {
    /// AppRole auth engine path; the server defaults to `approle` when empty
    pub engine: String,
    pub id: SecretString,
    pub secret: SecretString,
    /// Seconds between login retries
    #[serde(deserialize_with = "lenient_text")]
    pub retry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultStatus {
    /// Seconds between health pings
    #[serde(deserialize_with = "lenient_text")]
    pub ping: String,
}

impl ProviderSchema for VaultConfig {
    const RULES: &'static [FieldRule] = &[
        FieldRule::required(FieldId::VaultEndpoint, "endpoint"),
        FieldRule::optional(FieldId::VaultEngine, "engine"),
        FieldRule::optional(FieldId::VaultNamespace, "namespace"),
        FieldRule::optional(FieldId::VaultPrefix, "prefix"),
        FieldRule::optional(FieldId::VaultAppRoleEngine, "approle.engine"),
        FieldRule::required(FieldId::VaultId, "approle.id"),
        FieldRule::required(FieldId::VaultSecret, "approle.secret"),
        FieldRule::non_negative(FieldId::VaultRetry, "approle.retry"),
        FieldRule::non_negative(FieldId::VaultPing, "status.ping"),
    ];

    fn field_value(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::VaultEndpoint => Some(&self.endpoint),
            FieldId::VaultEngine => Some(&self.engine),
            FieldId::VaultNamespace => Some(&self.namespace),
            FieldId::VaultPrefix => Some(&self.prefix),
            FieldId::VaultAppRoleEngine => Some(&self.approle.engine),
            FieldId::VaultId => Some(self.approle.id.expose_secret()),
            FieldId::VaultSecret => Some(self.approle.secret.expose_secret()),
            FieldId::VaultRetry => Some(&self.approle.retry),
            FieldId::VaultPing => Some(&self.status.ping),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AWS Secrets Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub secretsmanager: AwsSecretsManager,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSecretsManager {
    pub endpoint: String,
    pub region: String,
    /// KMS key used to encrypt stored secrets; AWS default key when empty
    pub kmskey: String,
    pub credentials: AwsCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsCredentials {
    pub accesskey: String,
    pub secretkey: SecretString,
    /// Session token for temporary credentials
    pub token: SecretString,
}

impl ProviderSchema for AwsConfig {
    const RULES: &'static [FieldRule] = &[
        FieldRule::required(FieldId::AwsEndpoint, "secretsmanager.endpoint"),
        FieldRule::required(FieldId::AwsRegion, "secretsmanager.region"),
        FieldRule::optional(FieldId::AwsKmsKey, "secretsmanager.kmskey"),
        FieldRule::required(FieldId::AwsAccessKey, "secretsmanager.credentials.accesskey"),
        FieldRule::required(FieldId::AwsSecretKey, "secretsmanager.credentials.secretkey"),
        FieldRule::optional(FieldId::AwsToken, "secretsmanager.credentials.token"),
    ];

    fn field_value(&self, field: FieldId) -> Option<&str> {
        let sm = &self.secretsmanager;
        match field {
            FieldId::AwsEndpoint => Some(&sm.endpoint),
            FieldId::AwsRegion => Some(&sm.region),
            FieldId::AwsKmsKey => Some(&sm.kmskey),
            FieldId::AwsAccessKey => Some(&sm.credentials.accesskey),
            FieldId::AwsSecretKey => Some(sm.credentials.secretkey.expose_secret()),
            FieldId::AwsToken => Some(sm.credentials.token.expose_secret()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Gemalto KeySecure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemaltoConfig {
    pub keysecure: GemaltoKeySecure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemaltoKeySecure {
    pub endpoint: String,
    pub credentials: GemaltoCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemaltoCredentials {
    /// Refresh token
    pub token: SecretString,
    pub domain: String,
    #[serde(deserialize_with = "lenient_text")]
    pub retry: String,
}

impl ProviderSchema for GemaltoConfig {
    const RULES: &'static [FieldRule] = &[
        FieldRule::required(FieldId::GemaltoEndpoint, "keysecure.endpoint"),
        FieldRule::required(FieldId::GemaltoToken, "keysecure.credentials.token"),
        FieldRule::required(FieldId::GemaltoDomain, "keysecure.credentials.domain"),
        FieldRule::non_negative(FieldId::GemaltoRetry, "keysecure.credentials.retry"),
    ];

    fn field_value(&self, field: FieldId) -> Option<&str> {
        let ks = &self.keysecure;
        match field {
            FieldId::GemaltoEndpoint => Some(&ks.endpoint),
            FieldId::GemaltoToken => Some(ks.credentials.token.expose_secret()),
            FieldId::GemaltoDomain => Some(&ks.credentials.domain),
            FieldId::GemaltoRetry => Some(&ks.credentials.retry),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Azure Key Vault
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub keyvault: AzureKeyVault,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureKeyVault {
    pub endpoint: String,
    pub credentials: AzureCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ProviderSchema for AzureConfig {
    const RULES: &'static [FieldRule] = &[
        FieldRule::required(FieldId::AzureEndpoint, "keyvault.endpoint"),
        FieldRule::required(FieldId::AzureTenantId, "keyvault.credentials.tenant_id"),
        FieldRule::required(FieldId::AzureClientId, "keyvault.credentials.client_id"),
        FieldRule::required(FieldId::AzureClientSecret, "keyvault.credentials.client_secret"),
    ];

    fn field_value(&self, field: FieldId) -> Option<&str> {
        let kv = &self.keyvault;
        match field {
            FieldId::AzureEndpoint => Some(&kv.endpoint),
            FieldId::AzureTenantId => Some(&kv.credentials.tenant_id),
            FieldId::AzureClientId => Some(&kv.credentials.client_id),
            FieldId::AzureClientSecret => Some(kv.credentials.client_secret.expose_secret()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// GCP Secret Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpConfig {
    pub secretmanager: GcpSecretManager,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpSecretManager {
    pub project_id: String,
    pub endpoint: String,
    pub credentials: GcpCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpCredentials {
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    pub private_key: SecretString,
}

// GCP submissions are never blocked on missing fields; every row is optional.
impl ProviderSchema for GcpConfig {
    const RULES: &'static [FieldRule] = &[
        FieldRule::optional(FieldId::GcpProjectId, "secretmanager.project_id"),
        FieldRule::optional(FieldId::GcpEndpoint, "secretmanager.endpoint"),
        FieldRule::optional(FieldId::GcpClientEmail, "secretmanager.credentials.client_email"),
        FieldRule::optional(FieldId::GcpClientId, "secretmanager.credentials.client_id"),
        FieldRule::optional(FieldId::GcpPrivateKeyId, "secretmanager.credentials.private_key_id"),
        FieldRule::optional(FieldId::GcpPrivateKey, "secretmanager.credentials.private_key"),
    ];

    fn field_value(&self, field: FieldId) -> Option<&str> {
        let sm = &self.secretmanager;
        match field {
            FieldId::GcpProjectId => Some(&sm.project_id),
            FieldId::GcpEndpoint => Some(&sm.endpoint),
            FieldId::GcpClientEmail => Some(&sm.credentials.client_email),
            FieldId::GcpClientId => Some(&sm.credentials.client_id),
            FieldId::GcpPrivateKeyId => Some(&sm.credentials.private_key_id),
            FieldId::GcpPrivateKey => Some(sm.credentials.private_key.expose_secret()),
            _ => None,
        }
    }
}

/// Field bags for every provider, retained regardless of which one is active
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfigs {
    pub vault: VaultConfig,
    pub aws: AwsConfig,
    pub gemalto: GemaltoConfig,
    pub gcp: GcpConfig,
    pub azure: AzureConfig,
}

impl ProviderConfigs {
    /// Every credential across all providers, keyed by its field
    pub fn secrets_mut(&mut self) -> [(FieldId, &mut SecretString); 7] {
        [
            (FieldId::VaultId, &mut self.vault.approle.id),
            (FieldId::VaultSecret, &mut self.vault.approle.secret),
            (FieldId::AwsSecretKey, &mut self.aws.secretsmanager.credentials.secretkey),
            (FieldId::AwsToken, &mut self.aws.secretsmanager.credentials.token),
            (FieldId::GemaltoToken, &mut self.gemalto.keysecure.credentials.token),
            (FieldId::AzureClientSecret, &mut self.azure.keyvault.credentials.client_secret),
            (FieldId::GcpPrivateKey, &mut self.gcp.secretmanager.credentials.private_key),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roundtrip() {
        for provider in KmsProvider::ALL {
            let parsed: KmsProvider = provider.as_str().parse().unwrap();
            assert_eq!(provider, parsed);
        }
        assert!("hsm".parse::<KmsProvider>().is_err());
    }

    #[test]
    fn test_provider_serialization() {
        let json = serde_json::to_string(&KmsProvider::Gemalto).unwrap();
        assert_eq!(json, "\"gemalto\"");
        let parsed: KmsProvider = serde_json::from_str("\"azure\"").unwrap();
        assert_eq!(parsed, KmsProvider::Azure);
    }

    #[test]
    fn test_field_ids_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for field in FieldId::ALL {
            assert!(seen.insert(field.as_str()), "duplicate id {}", field);
            assert_eq!(field.as_str().parse::<FieldId>().unwrap(), field);
        }
        assert_eq!(FieldId::RunAsUser.to_string(), "kes_securityContext_runAsUser");
        assert_eq!(FieldId::AwsAccessKey.to_string(), "aws_accessKey");
    }

    #[test]
    fn test_rule_checks() {
        let required = FieldRule::required(FieldId::VaultEndpoint, "endpoint");
        assert_eq!(required.check(Some("")), Some(REQUIRED_MESSAGE));
        assert_eq!(required.check(Some("   ")), Some(REQUIRED_MESSAGE));
        assert_eq!(required.check(None), Some(REQUIRED_MESSAGE));
        assert_eq!(required.check(Some("https://vault:8200")), None);

        let numeric = FieldRule::non_negative(FieldId::VaultPing, "status.ping");
        assert_eq!(numeric.check(Some("")), None);
        assert_eq!(numeric.check(Some("0")), None);
        assert_eq!(numeric.check(Some("10")), None);
        assert_eq!(numeric.check(Some("-1")), Some(NON_NEGATIVE_MESSAGE));
        assert_eq!(numeric.check(Some("soon")), Some(NON_NEGATIVE_MESSAGE));

        let optional = FieldRule::optional(FieldId::VaultPrefix, "prefix");
        assert_eq!(optional.check(Some("")), None);
        assert_eq!(optional.check(None), None);
    }

    #[test]
    fn test_every_rule_field_is_readable() {
        let configs = ProviderConfigs::default();
        for rule in VaultConfig::RULES {
            assert!(configs.vault.field_value(rule.field).is_some(), "{}", rule.path);
        }
        for rule in AwsConfig::RULES {
            assert!(configs.aws.field_value(rule.field).is_some(), "{}", rule.path);
        }
        for rule in GemaltoConfig::RULES {
            assert!(configs.gemalto.field_value(rule.field).is_some(), "{}", rule.path);
        }
        for rule in AzureConfig::RULES {
            assert!(configs.azure.field_value(rule.field).is_some(), "{}", rule.path);
        }
        for rule in GcpConfig::RULES {
            assert!(configs.gcp.field_value(rule.field).is_some(), "{}", rule.path);
        }
    }

    #[test]
    fn test_gcp_schema_has_no_required_fields() {
        assert!(schema_for(KmsProvider::Gcp)
            .iter()
            .all(|rule| rule.constraint == Constraint::Optional));
    }

    #[test]
    fn test_schema_required_fields() {
        let required = |provider| {
            schema_for(provider)
                .iter()
                .filter(|rule| rule.constraint == Constraint::Required)
                .map(|rule| rule.path)
                .collect::<Vec<_>>()
        };

        assert_eq!(required(KmsProvider::Vault), vec!["endpoint", "approle.id", "approle.secret"]);
        assert_eq!(required(KmsProvider::Aws).len(), 4);
        assert_eq!(required(KmsProvider::Gemalto).len(), 3);
        assert_eq!(required(KmsProvider::Azure).len(), 4);
    }

    #[test]
    fn test_vault_config_deserializes_numeric_fields() {
        let json = r#"{
            "endpoint": "https://vault:8200",
            "approle": {"id": "role", "secret": "s3cr3t", "retry": 15},
            "status": {"ping": "10"}
        }"#;
        let vault: VaultConfig = serde_json::from_str(json).unwrap();
        assert_eq!(vault.approle.retry, "15");
        assert_eq!(vault.status.ping, "10");
        assert_eq!(vault.approle.secret.expose_secret(), "s3cr3t");
        assert_eq!(vault.engine, "");
    }
}
