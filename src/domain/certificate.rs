//! Certificate slot model
//!
//! Four independent slots cover the three trust relationships of the
//! encryption server: its own TLS identity, the client identity presented to
//! it, and the mTLS identity plus CA it uses towards the KMS. Each slot is
//! [`CertificateSlot::Empty`], [`CertificateSlot::Stored`] or
//! [`CertificateSlot::Pending`], never two at once.
//!
//! Removing a stored certificate records its name in the [`RemovalSet`] so the
//! backend deletes it on the next submit.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::provider::FieldId;
use crate::errors::{KmsplaneError, Result};
use crate::secrets::SecretString;

/// The four certificate slots of an encryption draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// TLS identity of the encryption server
    ServerTls,
    /// Client identity storage nodes present to the encryption server
    ClientMtls,
    /// Identity the encryption server presents to the KMS
    KmsMtls,
    /// CA used to verify the KMS
    KmsCa,
}

impl SlotKind {
    pub const ALL: [SlotKind; 4] =
        [SlotKind::ServerTls, SlotKind::ClientMtls, SlotKind::KmsMtls, SlotKind::KmsCa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerTls => "server_tls",
            Self::ClientMtls => "client_mtls",
            Self::KmsMtls => "kms_mtls",
            Self::KmsCa => "kms_ca",
        }
    }

    /// The CA slot holds a certificate only
    pub fn accepts_key(&self) -> bool {
        !matches!(self, Self::KmsCa)
    }

    /// Field identifier of the key half, if the slot has one
    pub fn key_field(&self) -> Option<FieldId> {
        match self {
            Self::ServerTls => Some(FieldId::ServerKey),
            Self::ClientMtls => Some(FieldId::ClientKey),
            Self::KmsMtls => Some(FieldId::KmsMtlsKey),
            Self::KmsCa => None,
        }
    }

    /// Field identifier of the certificate half
    pub fn cert_field(&self) -> FieldId {
        match self {
            Self::ServerTls => FieldId::ServerCert,
            Self::ClientMtls => FieldId::ClientCert,
            Self::KmsMtls => FieldId::KmsMtlsCert,
            Self::KmsCa => FieldId::KmsMtlsCa,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored certificate handle as reported by the backend.
///
/// Never carries key material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateInfo {
    pub name: String,
    pub serial_number: String,
    pub domains: Vec<String>,
    pub expiry: String,
}

impl CertificateInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// Encoded material entered by the user, not yet persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingCertificate {
    pub encoded_key: SecretString,
    pub encoded_cert: String,
}

impl PendingCertificate {
    pub fn new(encoded_key: impl Into<SecretString>, encoded_cert: impl Into<String>) -> Self {
        Self { encoded_key: encoded_key.into(), encoded_cert: encoded_cert.into() }
    }

    /// CA material carries a certificate only
    pub fn cert_only(encoded_cert: impl Into<String>) -> Self {
        Self { encoded_key: SecretString::default(), encoded_cert: encoded_cert.into() }
    }

    pub fn has_key(&self) -> bool {
        !self.encoded_key.is_blank()
    }

    pub fn has_cert(&self) -> bool {
        !self.encoded_cert.trim().is_empty()
    }

    /// Both halves of a key/cert pair are present
    pub fn is_complete_pair(&self) -> bool {
        self.has_key() && self.has_cert()
    }

    /// Exactly one half of a key/cert pair is present
    pub fn is_partial_pair(&self) -> bool {
        self.has_key() != self.has_cert()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CertificateSlot {
    #[default]
    Empty,
    Stored(CertificateInfo),
    Pending(PendingCertificate),
}

impl CertificateSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn stored(&self) -> Option<&CertificateInfo> {
        match self {
            Self::Stored(info) => Some(info),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingCertificate> {
        match self {
            Self::Pending(material) => Some(material),
            _ => None,
        }
    }
}

/// All certificate slots of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateSlots {
    pub server_tls: CertificateSlot,
    pub client_mtls: CertificateSlot,
    pub kms_mtls: CertificateSlot,
    pub kms_ca: CertificateSlot,
}

impl CertificateSlots {
    pub fn get(&self, kind: SlotKind) -> &CertificateSlot {
        match kind {
            SlotKind::ServerTls => &self.server_tls,
            SlotKind::ClientMtls => &self.client_mtls,
            SlotKind::KmsMtls => &self.kms_mtls,
            SlotKind::KmsCa => &self.kms_ca,
        }
    }

    fn get_mut(&mut self, kind: SlotKind) -> &mut CertificateSlot {
        match kind {
            SlotKind::ServerTls => &mut self.server_tls,
            SlotKind::ClientMtls => &mut self.client_mtls,
            SlotKind::KmsMtls => &mut self.kms_mtls,
            SlotKind::KmsCa => &mut self.kms_ca,
        }
    }

    /// Replace the pending material of a slot.
    ///
    /// Fails when the slot holds a stored certificate (it must be removed
    /// first) or when key material is given for the CA slot.
    pub fn set_pending(&mut self, kind: SlotKind, material: PendingCertificate) -> Result<()> {
        if !kind.accepts_key() && material.has_key() {
            return Err(KmsplaneError::certificate_slot(kind, "slot does not accept a private key"));
        }
        let slot = self.writable(kind)?;
        *slot = CertificateSlot::Pending(material);
        Ok(())
    }

    /// Set the key half of a pending pair, keeping the cert half
    pub fn set_pending_key(&mut self, kind: SlotKind, encoded_key: SecretString) -> Result<()> {
        if !kind.accepts_key() {
            return Err(KmsplaneError::certificate_slot(kind, "slot does not accept a private key"));
        }
        let slot = self.writable(kind)?;
        match slot {
            CertificateSlot::Pending(material) => material.encoded_key = encoded_key,
            _ => *slot = CertificateSlot::Pending(PendingCertificate::new(encoded_key, "")),
        }
        Ok(())
    }

    /// Set the cert half of a pending pair, keeping the key half
    pub fn set_pending_cert(&mut self, kind: SlotKind, encoded_cert: impl Into<String>) -> Result<()> {
        let encoded_cert = encoded_cert.into();
        let slot = self.writable(kind)?;
        match slot {
            CertificateSlot::Pending(material) => material.encoded_cert = encoded_cert,
            _ => *slot = CertificateSlot::Pending(PendingCertificate::cert_only(encoded_cert)),
        }
        Ok(())
    }

    fn writable(&mut self, kind: SlotKind) -> Result<&mut CertificateSlot> {
        let slot = self.get_mut(kind);
        if let CertificateSlot::Stored(info) = slot {
            return Err(KmsplaneError::certificate_slot(
                kind,
                format!("stored certificate '{}' must be removed before new material is set", info.name),
            ));
        }
        Ok(slot)
    }

    /// Move a stored slot to empty and record its name for deletion.
    ///
    /// Returns false when the slot held no stored certificate.
    pub fn remove_stored(&mut self, kind: SlotKind, removals: &mut RemovalSet) -> bool {
        let slot = self.get_mut(kind);
        match std::mem::take(slot) {
            CertificateSlot::Stored(info) => {
                removals.insert(info.name);
                true
            }
            other => {
                *slot = other;
                false
            }
        }
    }

    /// Drop pending material. Stored slots are left untouched.
    pub fn clear(&mut self, kind: SlotKind) {
        let slot = self.get_mut(kind);
        if matches!(slot, CertificateSlot::Pending(_)) {
            *slot = CertificateSlot::Empty;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &CertificateSlot)> {
        SlotKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Names of stored certificates to delete on the next submit.
///
/// Insertion order is kept and duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovalSet(Vec<String>);

impl RemovalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name was already present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() || self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for RemovalSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RemovalSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_slots() -> CertificateSlots {
        CertificateSlots {
            server_tls: CertificateSlot::Stored(CertificateInfo::named("kes-server-cert")),
            kms_ca: CertificateSlot::Stored(CertificateInfo::named("kms-ca")),
            ..CertificateSlots::default()
        }
    }

    #[test]
    fn test_remove_stored_is_idempotent() {
        let mut slots = stored_slots();
        let mut removals = RemovalSet::new();

        assert!(slots.remove_stored(SlotKind::ServerTls, &mut removals));
        assert!(!slots.remove_stored(SlotKind::ServerTls, &mut removals));

        assert!(slots.server_tls.is_empty());
        assert_eq!(removals.to_vec(), vec!["kes-server-cert".to_string()]);
    }

    #[test]
    fn test_remove_stored_leaves_pending_alone() {
        let mut slots = CertificateSlots::default();
        let mut removals = RemovalSet::new();
        slots.set_pending(SlotKind::ClientMtls, PendingCertificate::new("key", "cert")).unwrap();

        assert!(!slots.remove_stored(SlotKind::ClientMtls, &mut removals));
        assert!(slots.client_mtls.pending().is_some());
        assert!(removals.is_empty());
    }

    #[test]
    fn test_set_pending_refuses_stored_slot() {
        let mut slots = stored_slots();
        let result = slots.set_pending(SlotKind::ServerTls, PendingCertificate::new("k", "c"));

        assert!(matches!(
            result,
            Err(KmsplaneError::CertificateSlot { slot: SlotKind::ServerTls, .. })
        ));
        assert_eq!(slots.server_tls.stored().unwrap().name, "kes-server-cert");
    }

    #[test]
    fn test_replace_after_remove() {
        let mut slots = stored_slots();
        let mut removals = RemovalSet::new();

        slots.remove_stored(SlotKind::ServerTls, &mut removals);
        slots.set_pending(SlotKind::ServerTls, PendingCertificate::new("new-key", "new-cert")).unwrap();

        assert!(removals.contains("kes-server-cert"));
        assert_eq!(slots.server_tls.pending().unwrap().encoded_cert, "new-cert");
    }

    #[test]
    fn test_ca_slot_rejects_key() {
        let mut slots = CertificateSlots::default();

        assert!(slots.set_pending(SlotKind::KmsCa, PendingCertificate::new("key", "ca")).is_err());
        assert!(slots.set_pending_key(SlotKind::KmsCa, SecretString::new("key")).is_err());
        slots.set_pending_cert(SlotKind::KmsCa, "ca").unwrap();
        assert_eq!(slots.kms_ca.pending().unwrap().encoded_cert, "ca");
    }

    #[test]
    fn test_halves_are_set_independently() {
        let mut slots = CertificateSlots::default();

        slots.set_pending_cert(SlotKind::KmsMtls, "cert").unwrap();
        let material = slots.kms_mtls.pending().unwrap();
        assert!(material.is_partial_pair());

        slots.set_pending_key(SlotKind::KmsMtls, SecretString::new("key")).unwrap();
        let material = slots.kms_mtls.pending().unwrap();
        assert!(material.is_complete_pair());
        assert_eq!(material.encoded_cert, "cert");
    }

    #[test]
    fn test_clear_only_drops_pending() {
        let mut slots = stored_slots();
        slots.set_pending(SlotKind::KmsMtls, PendingCertificate::new("k", "c")).unwrap();

        slots.clear(SlotKind::KmsMtls);
        slots.clear(SlotKind::ServerTls);

        assert!(slots.kms_mtls.is_empty());
        assert!(slots.server_tls.stored().is_some());
    }

    #[test]
    fn test_removal_set_dedupes_in_order() {
        let set: RemovalSet = ["b", "a", "b", ""].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["b","a"]"#);
    }

    #[test]
    fn test_slot_serialization_is_tagged() {
        let slot = CertificateSlot::Stored(CertificateInfo::named("kes-client"));
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["state"], "stored");
        assert_eq!(json["name"], "kes-client");

        let slot: CertificateSlot = serde_json::from_str(
            r#"{"state": "pending", "encodedKey": "a2V5", "encodedCert": "Y2VydA=="}"#,
        )
        .unwrap();
        assert!(slot.pending().unwrap().is_complete_pair());
    }
}
