//! Configuration session flow control against an in-memory transport

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kmsplane::domain::{KmsProvider, PendingCertificate, SlotKind};
use kmsplane::errors::{KmsplaneError, Result};
use kmsplane::session::{
    ConfigurationSession, EncryptionTransport, LoadOutcome, SubmitOutcome, TenantRef,
};
use kmsplane::synthesis::{ConfigDocument, DisableDirective};
use kmsplane::TenantEncryptionInfo;

#[derive(Debug, Default)]
struct FakeTransport {
    /// Queued fetch responses with a delay in milliseconds
    fetches: Mutex<VecDeque<(u64, Result<TenantEncryptionInfo>)>>,
    /// Returned once the queue is empty
    fallback: Mutex<TenantEncryptionInfo>,
    applied: Mutex<Vec<ConfigDocument>>,
    disabled: Mutex<Vec<DisableDirective>>,
    submit_delay_ms: AtomicU64,
    fail_submit: AtomicBool,
}

impl FakeTransport {
    fn with_fallback(info: TenantEncryptionInfo) -> Arc<Self> {
        let transport = Self::default();
        *transport.fallback.lock().unwrap() = info;
        Arc::new(transport)
    }

    fn queue_fetch(&self, delay_ms: u64, response: Result<TenantEncryptionInfo>) {
        self.fetches.lock().unwrap().push_back((delay_ms, response));
    }

    fn applied(&self) -> Vec<ConfigDocument> {
        self.applied.lock().unwrap().clone()
    }

    fn disabled(&self) -> Vec<DisableDirective> {
        self.disabled.lock().unwrap().clone()
    }

    async fn submit_delay(&self) -> Result<()> {
        let delay = self.submit_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(KmsplaneError::transport_status("backend unavailable", 503));
        }
        Ok(())
    }
}

#[async_trait]
impl EncryptionTransport for FakeTransport {
    async fn fetch(&self, _tenant: &TenantRef) -> Result<TenantEncryptionInfo> {
        let next = self.fetches.lock().unwrap().pop_front();
        match next {
            Some((delay, response)) => {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                response
            }
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }

    async fn apply(&self, _tenant: &TenantRef, document: &ConfigDocument) -> Result<()> {
        self.submit_delay().await?;
        self.applied.lock().unwrap().push(document.clone());
        Ok(())
    }

    async fn disable(&self, _tenant: &TenantRef, directive: &DisableDirective) -> Result<()> {
        self.submit_delay().await?;
        self.disabled.lock().unwrap().push(directive.clone());
        Ok(())
    }
}

fn gcp_baseline() -> TenantEncryptionInfo {
    serde_json::from_value(json!({
        "image": "minio/kes:2023-05-02",
        "replicas": "2",
        "gcp": {"secretmanager": {"project_id": "storage-prod"}},
        "server_tls": {"name": "kes-tls"},
        "kms_mtls": {"ca": {"name": "kms-ca"}}
    }))
    .unwrap()
}

fn aws_baseline() -> TenantEncryptionInfo {
    serde_json::from_value(json!({
        "aws": {"secretsmanager": {
            "endpoint": "sm.us-east-1.amazonaws.com",
            "region": "us-east-1",
            "kmskey": "",
            "credentials": {"accesskey": "AK", "secretkey": "SK", "token": ""}
        }}
    }))
    .unwrap()
}

fn session_for(transport: Arc<FakeTransport>) -> ConfigurationSession {
    ConfigurationSession::new(TenantRef::new("tenant-ns", "storage"), transport)
}

#[tokio::test]
async fn test_load_replaces_draft_with_baseline() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport);

    assert_eq!(session.load().await.unwrap(), LoadOutcome::Applied);

    let draft = session.draft();
    assert!(draft.enabled);
    assert_eq!(draft.provider, KmsProvider::Gcp);
    assert_eq!(draft.replicas, "2");
    assert_eq!(draft.certificates.get(SlotKind::ServerTls).stored().unwrap().name, "kes-tls");
    assert!(session.validation().is_empty());
    assert!(session.can_submit());
}

#[tokio::test]
async fn test_stale_load_is_superseded() {
    let transport = Arc::new(FakeTransport::default());
    transport.queue_fetch(80, Ok(aws_baseline()));
    transport.queue_fetch(0, Ok(gcp_baseline()));
    let session = session_for(transport);

    let (first, second) = tokio::join!(session.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.load().await
    });

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    assert_eq!(session.draft().provider, KmsProvider::Gcp);
}

#[tokio::test]
async fn test_superseded_failure_is_not_reported() {
    let transport = Arc::new(FakeTransport::default());
    transport.queue_fetch(80, Err(KmsplaneError::transport("connection reset")));
    transport.queue_fetch(0, Ok(gcp_baseline()));
    let session = session_for(transport);

    let (first, second) = tokio::join!(session.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.load().await
    });

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
}

#[tokio::test]
async fn test_failed_load_keeps_draft() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport.clone());
    session.load().await.unwrap();
    session.set_enabled(false);

    transport.queue_fetch(0, Err(KmsplaneError::transport_status("boom", 500)));
    let error = session.load().await.unwrap_err();

    assert!(error.is_transport());
    assert!(error.to_string().contains("Failed to load encryption configuration"));
    assert!(!session.draft().enabled);
}

#[tokio::test]
async fn test_single_flight_submit() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    transport.submit_delay_ms.store(60, Ordering::SeqCst);
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    let (first, second) = tokio::join!(session.submit(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.is_submitting());
        assert!(!session.can_submit());
        session.submit().await
    });

    assert_eq!(first.unwrap(), SubmitOutcome::Submitted { reloaded: true });
    assert_eq!(second.unwrap(), SubmitOutcome::Ignored);
    assert_eq!(transport.applied().len(), 1);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn test_failed_submit_keeps_draft_and_removals() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    assert!(session.remove_stored_certificate(SlotKind::ServerTls));
    session.set_pending(SlotKind::ServerTls, PendingCertificate::new("a2V5", "Y3J0")).unwrap();
    let before = session.draft();

    transport.fail_submit.store(true, Ordering::SeqCst);
    let error = session.submit().await.unwrap_err();

    assert!(error.is_retryable());
    assert!(error.to_string().contains("Failed to submit encryption configuration"));
    assert_eq!(session.draft(), before);
    assert!(session.removals().contains("kes-tls"));
    assert!(!session.is_submitting());

    transport.fail_submit.store(false, Ordering::SeqCst);
    assert!(matches!(session.submit().await.unwrap(), SubmitOutcome::Submitted { .. }));
}

#[tokio::test]
async fn test_removal_set_is_sent_once_and_cleared() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    assert!(session.remove_stored_certificate(SlotKind::ServerTls));
    assert!(!session.remove_stored_certificate(SlotKind::ServerTls));
    assert!(session.remove_stored_certificate(SlotKind::KmsCa));
    assert_eq!(session.removals().len(), 2);

    session.set_pending(SlotKind::ServerTls, PendingCertificate::new("a2V5", "Y3J0")).unwrap();
    session.submit().await.unwrap();

    let applied = transport.applied();
    let json = serde_json::to_value(&applied[0]).unwrap();
    assert_eq!(json["secretsToBeDeleted"], json!(["kes-tls", "kms-ca"]));
    assert_eq!(json["server_tls"], json!({"key": "a2V5", "crt": "Y3J0"}));
    assert!(session.removals().is_empty());
}

#[tokio::test]
async fn test_disabled_draft_sends_directive() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    session.remove_stored_certificate(SlotKind::ServerTls);
    session.set_enabled(false);
    assert!(session.validation().is_empty());

    session.submit().await.unwrap();
    let disabled = transport.disabled();
    assert_eq!(disabled.len(), 1);
    assert_eq!(disabled[0].secrets_to_be_deleted, vec!["kes-tls".to_string()]);
    assert!(transport.applied().is_empty());
}

#[tokio::test]
async fn test_invalid_draft_blocks_submit() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    session.set_provider(KmsProvider::Vault);
    assert!(!session.can_submit());

    match session.submit().await.unwrap() {
        SubmitOutcome::Blocked(violations) => {
            assert_eq!(violations.get_key("vault_endpoint"), Some("Field cannot be empty"));
        }
        other => panic!("expected blocked submit, got {:?}", other),
    }
    assert!(transport.applied().is_empty());
}

#[tokio::test]
async fn test_discard_drops_in_flight_load() {
    let transport = Arc::new(FakeTransport::default());
    transport.queue_fetch(50, Ok(gcp_baseline()));
    let session = session_for(transport);

    let (outcome, _) = tokio::join!(session.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.discard();
    });

    assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
    assert!(session.baseline().is_none());
    assert!(!session.draft().enabled);
    assert_eq!(session.submit().await.unwrap(), SubmitOutcome::Discarded);
}

#[tokio::test]
async fn test_switch_tenant_supersedes_previous_load() {
    let transport = Arc::new(FakeTransport::default());
    transport.queue_fetch(80, Ok(aws_baseline()));
    transport.queue_fetch(0, Ok(gcp_baseline()));
    let session = session_for(transport);

    let (first, second) = tokio::join!(session.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.switch_tenant(TenantRef::new("other-ns", "archive")).await
    });

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    assert_eq!(session.tenant().to_string(), "other-ns/archive");
    assert_eq!(session.draft().provider, KmsProvider::Gcp);
}

#[tokio::test]
async fn test_submit_settling_after_tenant_switch_keeps_new_edits() {
    let transport = FakeTransport::with_fallback(gcp_baseline());
    transport.submit_delay_ms.store(80, Ordering::SeqCst);
    let session = session_for(transport.clone());
    session.load().await.unwrap();

    let (first, _) = tokio::join!(session.submit(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.switch_tenant(TenantRef::new("other-ns", "archive")).await.unwrap();
        assert!(session.remove_stored_certificate(SlotKind::ServerTls));
        session.set_pending(SlotKind::ServerTls, PendingCertificate::new("a2V5", "Y3J0")).unwrap();

        assert!(session.is_submitting());
        assert_eq!(session.submit().await.unwrap(), SubmitOutcome::Ignored);
    });

    assert_eq!(first.unwrap(), SubmitOutcome::Superseded);
    assert_eq!(transport.applied().len(), 1);
    assert!(!session.is_submitting());
    assert_eq!(session.tenant().to_string(), "other-ns/archive");
    assert!(session.removals().contains("kes-tls"));
    assert!(session.draft().certificates.get(SlotKind::ServerTls).pending().is_some());

    assert_eq!(session.submit().await.unwrap(), SubmitOutcome::Submitted { reloaded: true });
    assert_eq!(transport.applied().len(), 2);
}
