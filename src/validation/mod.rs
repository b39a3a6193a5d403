//! # Draft Validation
//!
//! [`validate`] is a pure function of an [`EncryptionDraft`]. It collects
//! every violation instead of stopping at the first, and it is cheap enough to
//! run after each field edit so the caller can keep the submit action
//! disabled while the result is non-empty.
//!
//! Checks, when encryption is enabled:
//! 1. replicas is an integer ≥ 1
//! 2. each pod security numeric is present and an integer ≥ 0
//! 3. half-filled pending certificate pairs are noted (never a violation)
//! 4. the active provider's schema; skipped when a raw override is submitted
//!
//! A disabled draft always validates empty.
//!
//! Raw-edit mode deliberately skips only check 4. The override replaces the
//! provider and certificate blocks, while replicas and pod security are still
//! sent alongside it and must stay well formed.

pub mod result;

pub use result::ValidationResult;

use tracing::debug;

use crate::domain::text::parse_integer;
use crate::domain::{EncryptionDraft, FieldId, KmsProvider, ProviderSchema, SlotKind};

pub const REPLICAS_MESSAGE: &str = "Replicas needs to be 1 or greater";

/// Validate a draft, returning every violation keyed by field identifier
pub fn validate(draft: &EncryptionDraft) -> ValidationResult {
    let mut result = ValidationResult::new();
    if !draft.enabled {
        return result;
    }

    match parse_integer(&draft.replicas) {
        Some(replicas) if replicas >= 1 => {}
        _ => result.insert(FieldId::Replicas, REPLICAS_MESSAGE),
    }

    let security = &draft.pod_security;
    for (field, label, value) in [
        (FieldId::RunAsUser, "runAsUser", &security.run_as_user),
        (FieldId::RunAsGroup, "runAsGroup", &security.run_as_group),
        (FieldId::FsGroup, "fsGroup", &security.fs_group),
    ] {
        match parse_integer(value) {
            Some(id) if id >= 0 => {}
            _ => result.insert(field, format!("{} must be present and be 0 or more", label)),
        }
    }

    if draft.custom_certificates_enabled {
        note_partial_pairs(draft);
    }

    if draft.raw_payload().is_none() {
        let providers = &draft.providers;
        match draft.provider {
            KmsProvider::Vault => check_schema(&providers.vault, &mut result),
            KmsProvider::Aws => check_schema(&providers.aws, &mut result),
            KmsProvider::Gemalto => check_schema(&providers.gemalto, &mut result),
            KmsProvider::Gcp => check_schema(&providers.gcp, &mut result),
            KmsProvider::Azure => check_schema(&providers.azure, &mut result),
        }
    }

    result
}

fn check_schema<S: ProviderSchema>(config: &S, result: &mut ValidationResult) {
    for rule in S::RULES {
        if let Some(message) = rule.check(config.field_value(rule.field)) {
            result.insert(rule.field, message);
        }
    }
}

// Half-filled pairs are accepted and later omitted from the document.
fn note_partial_pairs(draft: &EncryptionDraft) {
    for kind in [SlotKind::ServerTls, SlotKind::ClientMtls, SlotKind::KmsMtls] {
        if let Some(material) = draft.certificates.get(kind).pending() {
            if material.is_partial_pair() {
                debug!(
                    slot = %kind,
                    has_key = material.has_key(),
                    has_cert = material.has_cert(),
                    "Pending certificate pair is incomplete and will not be submitted"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EditMode, PendingCertificate};
    use crate::secrets::SecretString;
    use tracing_test::traced_test;

    fn vault_draft() -> EncryptionDraft {
        let mut draft = EncryptionDraft { enabled: true, ..EncryptionDraft::default() };
        let vault = &mut draft.providers.vault;
        vault.endpoint = "https://vault.local:8200".to_string();
        vault.approle.id = SecretString::new("role-id");
        vault.approle.secret = SecretString::new("secret-id");
        draft
    }

    #[test]
    fn test_complete_vault_draft_is_valid() {
        assert!(validate(&vault_draft()).is_empty());
    }

    #[test]
    fn test_disabled_draft_is_always_valid() {
        let mut draft = vault_draft();
        draft.enabled = false;
        draft.providers.vault.endpoint.clear();
        draft.replicas = "-5".to_string();
        draft.pod_security.run_as_user = "nope".to_string();

        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_empty_vault_endpoint() {
        let mut draft = vault_draft();
        draft.providers.vault.endpoint = String::new();

        let result = validate(&draft);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(FieldId::VaultEndpoint), Some("Field cannot be empty"));
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let mut draft = vault_draft();
        draft.providers.vault.approle.secret = SecretString::new("   ");

        let result = validate(&draft);
        assert_eq!(result.fields().collect::<Vec<_>>(), vec![FieldId::VaultSecret]);
    }

    #[test]
    fn test_replicas_bounds() {
        let mut draft = vault_draft();

        draft.replicas = "0".to_string();
        assert_eq!(validate(&draft).get(FieldId::Replicas), Some(REPLICAS_MESSAGE));

        draft.replicas = "two".to_string();
        assert_eq!(validate(&draft).get(FieldId::Replicas), Some(REPLICAS_MESSAGE));

        draft.replicas = "1".to_string();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_pod_security_fields() {
        let mut draft = vault_draft();
        draft.pod_security.run_as_user = String::new();
        draft.pod_security.run_as_group = "-1".to_string();
        draft.pod_security.fs_group = "0".to_string();
        draft.pod_security.run_as_non_root = false;

        let result = validate(&draft);
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.get(FieldId::RunAsUser),
            Some("runAsUser must be present and be 0 or more")
        );
        assert_eq!(
            result.get(FieldId::RunAsGroup),
            Some("runAsGroup must be present and be 0 or more")
        );
    }

    #[test]
    fn test_negative_optional_numerics() {
        let mut draft = vault_draft();
        draft.providers.vault.approle.retry = "-1".to_string();
        draft.providers.vault.status.ping = "10".to_string();

        let result = validate(&draft);
        assert_eq!(result.get(FieldId::VaultRetry), Some("Value needs to be 0 or greater"));
        assert!(!result.contains(FieldId::VaultPing));
    }

    #[test]
    fn test_inactive_provider_is_ignored() {
        let mut draft = vault_draft();
        draft.providers.aws.secretsmanager.endpoint = String::new();
        draft.providers.gemalto.keysecure.credentials.retry = "-3".to_string();

        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_gcp_never_blocks() {
        let draft = EncryptionDraft {
            enabled: true,
            provider: KmsProvider::Gcp,
            ..EncryptionDraft::default()
        };
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_azure_requires_all_fields() {
        let draft = EncryptionDraft {
            enabled: true,
            provider: KmsProvider::Azure,
            ..EncryptionDraft::default()
        };
        let result = validate(&draft);
        assert_eq!(
            result.fields().collect::<Vec<_>>(),
            vec![
                FieldId::AzureEndpoint,
                FieldId::AzureTenantId,
                FieldId::AzureClientId,
                FieldId::AzureClientSecret
            ]
        );
    }

    #[traced_test]
    #[test]
    fn test_partial_certificate_pairs_are_allowed() {
        let mut draft = vault_draft();
        draft.custom_certificates_enabled = true;
        draft
            .certificates
            .set_pending(SlotKind::ServerTls, PendingCertificate::new("", "cert-only"))
            .unwrap();

        assert!(validate(&draft).is_empty());
        assert!(logs_contain("Pending certificate pair is incomplete"));
    }

    #[test]
    fn test_raw_edit_skips_provider_schema_only() {
        let mut draft = vault_draft();
        draft.providers.vault.endpoint.clear();
        draft.replicas = "0".to_string();
        draft.raw_override = Some("address: 0.0.0.0:7373".to_string());
        draft.edit_mode = EditMode::RawEdit;

        let result = validate(&draft);
        assert_eq!(result.fields().collect::<Vec<_>>(), vec![FieldId::Replicas]);
    }
}
