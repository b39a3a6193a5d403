//! # Synthesis
//!
//! Converts a validated [`EncryptionDraft`] and the session's [`RemovalSet`]
//! into the single request the backend expects.
//!
//! - a disabled draft becomes a [`DisableDirective`] carrying only the removals
//! - an enabled draft becomes a [`ConfigDocument`] with exactly one provider
//!   block, numerics coerced to integers and pending certificate material
//!
//! Synthesis of a draft that does not validate is a programming error and is
//! reported as [`KmsplaneError::Precondition`].

pub mod document;

pub use document::{
    AwsCredentialsDocument, AwsDocument, AwsSecretsManagerDocument, AzureCredentialsDocument,
    AzureDocument, AzureKeyVaultDocument, ConfigDocument, DisableDirective, EncryptionUpdate,
    GcpCredentialsDocument, GcpDocument, GcpSecretManagerDocument, GemaltoCredentialsDocument,
    GemaltoDocument, GemaltoKeySecureDocument, KeyPairDocument, KmsMtlsDocument, ProviderDocument,
    SecurityContextDocument, VaultAppRoleDocument, VaultDocument, VaultStatusDocument,
};

use tracing::{debug, error};

use crate::domain::text::parse_integer;
use crate::domain::{
    AwsConfig, AzureConfig, CertificateSlots, EncryptionDraft, GcpConfig, GemaltoConfig,
    KmsProvider, PodSecurityDraft, ProviderConfigs, RemovalSet, SlotKind, VaultConfig,
};
use crate::errors::{KmsplaneError, Result};
use crate::validation::validate;

/// Produce the update request for a draft
pub fn synthesize(draft: &EncryptionDraft, removals: &RemovalSet) -> Result<EncryptionUpdate> {
    if !draft.enabled {
        debug!(removals = removals.len(), "Synthesizing encryption disable directive");
        return Ok(EncryptionUpdate::Disable(DisableDirective {
            secrets_to_be_deleted: removals.to_vec(),
        }));
    }

    let violations = validate(draft);
    if !violations.is_empty() {
        error!(
            provider = %draft.provider,
            violations = %violations,
            "Synthesis invoked on a draft that does not validate"
        );
        return Err(KmsplaneError::precondition(format!(
            "draft does not validate: {}",
            violations
        )));
    }

    let replicas = parse_integer(&draft.replicas)
        .ok_or_else(|| KmsplaneError::precondition("replicas is not an integer"))?;
    let security_context = security_context(&draft.pod_security)?;

    let document = ConfigDocument {
        raw: draft.raw_payload().unwrap_or_default().to_string(),
        secrets_to_be_deleted: removals.to_vec(),
        replicas,
        security_context,
        image: draft.image.clone(),
        server_tls: key_pair(&draft.certificates, SlotKind::ServerTls),
        minio_mtls: key_pair(&draft.certificates, SlotKind::ClientMtls),
        kms_mtls: kms_mtls(&draft.certificates),
        provider: provider_document(draft.provider, &draft.providers),
    };

    debug!(
        provider = %draft.provider,
        replicas = document.replicas,
        removals = document.secrets_to_be_deleted.len(),
        raw = !document.raw.is_empty(),
        "Synthesized encryption configuration document"
    );

    Ok(EncryptionUpdate::Apply(document))
}

fn security_context(security: &PodSecurityDraft) -> Result<SecurityContextDocument> {
    let required = |label: &str, value: &str| {
        parse_integer(value)
            .ok_or_else(|| KmsplaneError::precondition(format!("{} is not an integer", label)))
    };

    Ok(SecurityContextDocument {
        run_as_user: required("runAsUser", &security.run_as_user)?,
        run_as_group: required("runAsGroup", &security.run_as_group)?,
        fs_group: required("fsGroup", &security.fs_group)?,
        run_as_non_root: security.run_as_non_root,
        fs_group_change_policy: security.fs_group_change_policy,
    })
}

fn key_pair(slots: &CertificateSlots, kind: SlotKind) -> Option<KeyPairDocument> {
    slots
        .get(kind)
        .pending()
        .filter(|material| material.is_complete_pair())
        .map(|material| KeyPairDocument {
            key: material.encoded_key.clone(),
            crt: material.encoded_cert.clone(),
        })
}

fn kms_mtls(slots: &CertificateSlots) -> Option<KmsMtlsDocument> {
    let pair = key_pair(slots, SlotKind::KmsMtls);
    let ca = slots
        .kms_ca
        .pending()
        .filter(|material| material.has_cert())
        .map(|material| material.encoded_cert.clone());

    if pair.is_none() && ca.is_none() {
        return None;
    }
    Some(KmsMtlsDocument { pair, ca })
}

fn provider_document(provider: KmsProvider, configs: &ProviderConfigs) -> ProviderDocument {
    match provider {
        KmsProvider::Vault => ProviderDocument::Vault(vault_document(&configs.vault)),
        KmsProvider::Aws => ProviderDocument::Aws(aws_document(&configs.aws)),
        KmsProvider::Gemalto => ProviderDocument::Gemalto(gemalto_document(&configs.gemalto)),
        KmsProvider::Gcp => ProviderDocument::Gcp(gcp_document(&configs.gcp)),
        KmsProvider::Azure => ProviderDocument::Azure(azure_document(&configs.azure)),
    }
}

fn vault_document(vault: &VaultConfig) -> VaultDocument {
    VaultDocument {
        endpoint: vault.endpoint.clone(),
        engine: vault.engine.clone(),
        namespace: vault.namespace.clone(),
        prefix: vault.prefix.clone(),
        approle: VaultAppRoleDocument {
            engine: vault.approle.engine.clone(),
            id: vault.approle.id.clone(),
            secret: vault.approle.secret.clone(),
            retry: parse_integer(&vault.approle.retry),
        },
        status: parse_integer(&vault.status.ping).map(|ping| VaultStatusDocument { ping }),
    }
}

fn aws_document(aws: &AwsConfig) -> AwsDocument {
    let sm = &aws.secretsmanager;
    AwsDocument {
        secretsmanager: AwsSecretsManagerDocument {
            endpoint: sm.endpoint.clone(),
            region: sm.region.clone(),
            kmskey: sm.kmskey.clone(),
            credentials: AwsCredentialsDocument {
                accesskey: sm.credentials.accesskey.clone(),
                secretkey: sm.credentials.secretkey.clone(),
                token: sm.credentials.token.clone(),
            },
        },
    }
}

fn gemalto_document(gemalto: &GemaltoConfig) -> GemaltoDocument {
    let ks = &gemalto.keysecure;
    GemaltoDocument {
        keysecure: GemaltoKeySecureDocument {
            endpoint: ks.endpoint.clone(),
            credentials: GemaltoCredentialsDocument {
                token: ks.credentials.token.clone(),
                domain: ks.credentials.domain.clone(),
                retry: parse_integer(&ks.credentials.retry),
            },
        },
    }
}

fn gcp_document(gcp: &GcpConfig) -> GcpDocument {
    let sm = &gcp.secretmanager;
    GcpDocument {
        secretmanager: GcpSecretManagerDocument {
            project_id: sm.project_id.clone(),
            endpoint: sm.endpoint.clone(),
            credentials: GcpCredentialsDocument {
                client_email: sm.credentials.client_email.clone(),
                client_id: sm.credentials.client_id.clone(),
                private_key_id: sm.credentials.private_key_id.clone(),
                private_key: sm.credentials.private_key.clone(),
            },
        },
    }
}

fn azure_document(azure: &AzureConfig) -> AzureDocument {
    let kv = &azure.keyvault;
    AzureDocument {
        keyvault: AzureKeyVaultDocument {
            endpoint: kv.endpoint.clone(),
            credentials: AzureCredentialsDocument {
                tenant_id: kv.credentials.tenant_id.clone(),
                client_id: kv.credentials.client_id.clone(),
                client_secret: kv.credentials.client_secret.clone(),
            },
        },
    }
}
