//! The editable encryption draft
//!
//! [`EncryptionDraft`] is the single aggregate the presentation layer mutates.
//! It is built from a fetched [`TenantEncryptionInfo`] on every load and is
//! also the shape of draft files read by the command line tool.

use serde::{Deserialize, Serialize};

use super::baseline::TenantEncryptionInfo;
use super::certificate::{CertificateSlot, CertificateSlots};
use super::provider::{FieldId, KmsProvider, ProviderConfigs};
use super::text::lenient_text;

/// Kubernetes `fsGroupChangePolicy` of the encryption server pods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsGroupChangePolicy {
    #[default]
    Always,
    OnRootMismatch,
}

/// Which submission path is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    /// Structured provider and certificate fields
    #[default]
    Options,
    /// The raw override document is sent verbatim
    RawEdit,
}

/// Pod security settings as entered; numerics stay text until synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodSecurityDraft {
    #[serde(deserialize_with = "lenient_text")]
    pub run_as_user: String,
    #[serde(deserialize_with = "lenient_text")]
    pub run_as_group: String,
    #[serde(deserialize_with = "lenient_text")]
    pub fs_group: String,
    pub run_as_non_root: bool,
    pub fs_group_change_policy: FsGroupChangePolicy,
}

impl Default for PodSecurityDraft {
    fn default() -> Self {
        Self {
            run_as_user: "1000".to_string(),
            run_as_group: "1000".to_string(),
            fs_group: "1000".to_string(),
            run_as_non_root: true,
            fs_group_change_policy: FsGroupChangePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncryptionDraft {
    /// Master switch; a disabled draft synthesizes a deletion request
    pub enabled: bool,
    pub provider: KmsProvider,
    /// Field bags for all providers; only the active one is used
    #[serde(flatten)]
    pub providers: ProviderConfigs,
    #[serde(deserialize_with = "lenient_text")]
    pub replicas: String,
    #[serde(rename = "securityContext")]
    pub pod_security: PodSecurityDraft,
    pub image: String,
    pub custom_certificates_enabled: bool,
    pub certificates: CertificateSlots,
    pub raw_override: Option<String>,
    pub edit_mode: EditMode,
}

impl Default for EncryptionDraft {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: KmsProvider::default(),
            providers: ProviderConfigs::default(),
            replicas: "1".to_string(),
            pod_security: PodSecurityDraft::default(),
            image: String::new(),
            custom_certificates_enabled: false,
            certificates: CertificateSlots::default(),
            raw_override: None,
            edit_mode: EditMode::default(),
        }
    }
}

impl EncryptionDraft {
    /// Build the draft for a freshly fetched configuration
    pub fn from_baseline(info: &TenantEncryptionInfo) -> Self {
        let mut draft = EncryptionDraft::default();

        if let Some(provider) = info.active_provider() {
            draft.enabled = true;
            draft.provider = provider;
        }
        if let Some(vault) = &info.vault {
            draft.providers.vault = vault.clone();
        }
        if let Some(aws) = &info.aws {
            draft.providers.aws = aws.clone();
        }
        if let Some(gemalto) = &info.gemalto {
            draft.providers.gemalto = gemalto.clone();
        }
        if let Some(gcp) = &info.gcp {
            draft.providers.gcp = gcp.clone();
        }
        if let Some(azure) = &info.azure {
            draft.providers.azure = azure.clone();
        }

        if !info.replicas.trim().is_empty() {
            draft.replicas = info.replicas.clone();
        }
        if let Some(security) = &info.security_context {
            draft.pod_security = security.clone();
        }
        draft.image = info.image.clone();

        let slots = &mut draft.certificates;
        if let Some(server) = &info.server_tls {
            slots.server_tls = CertificateSlot::Stored(server.clone());
        }
        if let Some(client) = &info.minio_mtls {
            slots.client_mtls = CertificateSlot::Stored(client.clone());
        }
        if let Some(kms) = &info.kms_mtls {
            if let Some(crt) = &kms.crt {
                slots.kms_mtls = CertificateSlot::Stored(crt.clone());
            }
            if let Some(ca) = &kms.ca {
                slots.kms_ca = CertificateSlot::Stored(ca.clone());
            }
        }
        draft.custom_certificates_enabled = info.has_certificates();

        if !info.raw.is_empty() {
            draft.raw_override = Some(info.raw.clone());
        }
        draft
    }

    /// Fill redacted credential placeholders from `source`.
    ///
    /// A draft dumped with redacting serialization carries `[REDACTED]` in
    /// place of every non-empty secret. Placeholders are replaced with the value
    /// `source` holds for the same field. Returns the fields that still hold a
    /// placeholder afterwards, including redacted pending private keys.
    pub fn restore_redacted(&mut self, source: &EncryptionDraft) -> Vec<FieldId> {
        let mut known = source.providers.clone();
        let mut unresolved = Vec::new();

        for ((field, secret), (_, value)) in
            self.providers.secrets_mut().into_iter().zip(known.secrets_mut())
        {
            if !secret.is_redacted() {
                continue;
            }
            if value.is_redacted() || value.is_blank() {
                unresolved.push(field);
            } else {
                *secret = value.clone();
            }
        }

        for (kind, slot) in self.certificates.iter() {
            if let (Some(pending), Some(field)) = (slot.pending(), kind.key_field()) {
                if pending.encoded_key.is_redacted() {
                    unresolved.push(field);
                }
            }
        }
        unresolved
    }

    /// Fields that hold a redacted placeholder instead of a value
    pub fn redacted_fields(&self) -> Vec<FieldId> {
        self.clone().restore_redacted(&EncryptionDraft::default())
    }

    /// The override to send verbatim, when raw-edit mode is active
    pub fn raw_payload(&self) -> Option<&str> {
        match (self.edit_mode, self.raw_override.as_deref()) {
            (EditMode::RawEdit, Some(raw)) if !raw.trim().is_empty() => Some(raw),
            _ => None,
        }
    }
}
