//! # Configuration Session
//!
//! A [`ConfigurationSession`] owns the draft of one tenant: the fetched
//! baseline, the edits applied to it, the certificate removal set and the
//! latest validation result.
//!
//! Flow control:
//! - every edit re-runs validation
//! - loads are tagged with a generation; only the most recent load may apply
//! - at most one submit is in flight; extra submits are ignored, not queued
//! - a successful submit clears the removal set and reloads the baseline
//! - switching tenant starts a new epoch; a submit from an older epoch keeps
//!   the single-flight flag until it settles but its result is dropped
//! - after [`ConfigurationSession::discard`] every pending result is dropped
//!
//! The state lock is never held across an `.await`.

pub mod transport;

pub use transport::{EncryptionTransport, TenantRef};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn, Instrument};

use crate::domain::{
    EncryptionDraft, KmsProvider, PendingCertificate, RemovalSet, SlotKind, TenantEncryptionInfo,
};
use crate::errors::Result;
use crate::secrets::SecretString;
use crate::session_span;
use crate::synthesis::{synthesize, EncryptionUpdate};
use crate::validation::{validate, ValidationResult};

/// Result of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched configuration replaced the draft
    Applied,
    /// A newer load was requested meanwhile; the result was dropped
    Superseded,
    /// The session was discarded; the result was dropped
    Discarded,
}

/// Result of a submit request
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The update was persisted; `reloaded` reports whether the follow-up load applied
    Submitted { reloaded: bool },
    /// Another submit is still in flight
    Ignored,
    /// The draft does not validate
    Blocked(ValidationResult),
    /// The session moved to another tenant while the submit was in flight
    Superseded,
    /// The session was discarded
    Discarded,
}

#[derive(Debug)]
struct SessionState {
    tenant: TenantRef,
    baseline: Option<TenantEncryptionInfo>,
    draft: EncryptionDraft,
    removals: RemovalSet,
    validation: ValidationResult,
    load_generation: u64,
    epoch: u64,
    submitting: bool,
    discarded: bool,
}

impl SessionState {
    fn new(tenant: TenantRef) -> Self {
        let draft = EncryptionDraft::default();
        let validation = validate(&draft);
        Self {
            tenant,
            baseline: None,
            draft,
            removals: RemovalSet::new(),
            validation,
            load_generation: 0,
            epoch: 0,
            submitting: false,
            discarded: false,
        }
    }

    fn revalidate(&mut self) {
        self.validation = validate(&self.draft);
    }
}

/// Draft state of one tenant plus its load/submit discipline
#[derive(Debug, Clone)]
pub struct ConfigurationSession {
    state: Arc<Mutex<SessionState>>,
    transport: Arc<dyn EncryptionTransport>,
}

/// Clears the in-flight flag however the submit ends.
///
/// Only one submit is in flight per session across tenant switches, so the
/// flag always belongs to the guard's submit.
struct SubmitGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).submitting = false;
    }
}

impl ConfigurationSession {
    /// Create a session for a tenant. Nothing is fetched until [`Self::load`].
    pub fn new(tenant: TenantRef, transport: Arc<dyn EncryptionTransport>) -> Self {
        Self { state: Arc::new(Mutex::new(SessionState::new(tenant))), transport }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the baseline and replace the draft with it.
    ///
    /// A failed load leaves the current draft untouched. A load overtaken by
    /// a newer one reports [`LoadOutcome::Superseded`], including on failure.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let (generation, tenant) = {
            let mut state = self.lock();
            if state.discarded {
                return Ok(LoadOutcome::Discarded);
            }
            state.load_generation += 1;
            (state.load_generation, state.tenant.clone())
        };

        let span = session_span!("load", tenant, generation = generation);
        let fetched = self.transport.fetch(&tenant).instrument(span.clone()).await;
        let _entered = span.enter();

        let mut state = self.lock();
        if state.discarded {
            debug!("Session discarded while loading; dropping result");
            return Ok(LoadOutcome::Discarded);
        }
        if state.load_generation != generation {
            debug!(latest = state.load_generation, "Load superseded by a newer request");
            return Ok(LoadOutcome::Superseded);
        }

        match fetched {
            Ok(info) => {
                state.draft = EncryptionDraft::from_baseline(&info);
                state.removals.clear();
                state.revalidate();
                info!(
                    enabled = state.draft.enabled,
                    provider = %state.draft.provider,
                    "Loaded tenant encryption configuration"
                );
                state.baseline = Some(info);
                Ok(LoadOutcome::Applied)
            }
            Err(error) => {
                warn!(error = %error, "Failed to load tenant encryption configuration");
                Err(error.with_context("Failed to load encryption configuration"))
            }
        }
    }

    /// Point the session at another tenant and load it.
    ///
    /// The previous tenant's draft is dropped immediately; any load still in
    /// flight for it is superseded.
    pub async fn switch_tenant(&self, tenant: TenantRef) -> Result<LoadOutcome> {
        {
            let mut state = self.lock();
            if state.discarded {
                return Ok(LoadOutcome::Discarded);
            }
            debug!(from = %state.tenant, to = %tenant, "Switching tenant");
            let mut next = SessionState::new(tenant);
            next.load_generation = state.load_generation;
            next.epoch = state.epoch + 1;
            next.submitting = state.submitting;
            *state = next;
        }
        self.load().await
    }

    /// Validate, synthesize and send the draft.
    ///
    /// A transport failure is returned as an error and leaves the draft as it
    /// was so the user can retry.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let (update, tenant, epoch, guard) = {
            let mut state = self.lock();
            if state.discarded {
                return Ok(SubmitOutcome::Discarded);
            }
            if state.submitting {
                debug!(tenant = %state.tenant, "Submit already in flight; ignoring");
                return Ok(SubmitOutcome::Ignored);
            }

            state.revalidate();
            if !state.validation.is_empty() {
                debug!(
                    tenant = %state.tenant,
                    violations = state.validation.len(),
                    "Submit blocked by validation"
                );
                return Ok(SubmitOutcome::Blocked(state.validation.clone()));
            }

            let update = synthesize(&state.draft, &state.removals)?;
            state.submitting = true;
            let guard = SubmitGuard { state: Arc::clone(&self.state) };
            (update, state.tenant.clone(), state.epoch, guard)
        };

        let action = if update.is_disable() { "disable" } else { "apply" };
        let span = session_span!("submit", tenant, action = action);
        let sent = self.send(&tenant, &update).instrument(span.clone()).await;
        drop(guard);

        {
            let _entered = span.enter();
            let mut state = self.lock();
            if state.discarded {
                debug!("Session discarded while submitting; dropping result");
                return Ok(SubmitOutcome::Discarded);
            }
            if state.epoch != epoch {
                debug!(current = %state.tenant, "Tenant switched while submitting; dropping result");
                return Ok(SubmitOutcome::Superseded);
            }
            if let Err(error) = sent {
                warn!(error = %error, "Failed to submit encryption configuration");
                return Err(error.with_context("Failed to submit encryption configuration"));
            }
            state.removals.clear();
            info!(removed = update.secrets_to_be_deleted().len(), "Submitted encryption configuration");
        }

        let reloaded = match self.load().await {
            Ok(outcome) => outcome == LoadOutcome::Applied,
            Err(error) => {
                warn!(error = %error, "Reload after submit failed");
                false
            }
        };
        Ok(SubmitOutcome::Submitted { reloaded })
    }

    async fn send(&self, tenant: &TenantRef, update: &EncryptionUpdate) -> Result<()> {
        match update {
            EncryptionUpdate::Apply(document) => self.transport.apply(tenant, document).await,
            EncryptionUpdate::Disable(directive) => self.transport.disable(tenant, directive).await,
        }
    }

    /// Apply an arbitrary edit to the draft and revalidate
    pub fn edit<F, R>(&self, edit: F) -> R
    where
        F: FnOnce(&mut EncryptionDraft) -> R,
    {
        let mut state = self.lock();
        let result = edit(&mut state.draft);
        state.revalidate();
        result
    }

    /// Select the active provider. Other providers' fields are kept.
    pub fn set_provider(&self, provider: KmsProvider) {
        self.edit(|draft| draft.provider = provider);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.edit(|draft| draft.enabled = enabled);
    }

    pub fn set_pending(&self, kind: SlotKind, material: PendingCertificate) -> Result<()> {
        self.edit(|draft| draft.certificates.set_pending(kind, material))
    }

    pub fn set_pending_key(&self, kind: SlotKind, encoded_key: SecretString) -> Result<()> {
        self.edit(|draft| draft.certificates.set_pending_key(kind, encoded_key))
    }

    pub fn set_pending_cert(&self, kind: SlotKind, encoded_cert: impl Into<String>) -> Result<()> {
        let encoded_cert = encoded_cert.into();
        self.edit(|draft| draft.certificates.set_pending_cert(kind, encoded_cert))
    }

    /// Mark the stored certificate of a slot for deletion
    pub fn remove_stored_certificate(&self, kind: SlotKind) -> bool {
        let mut state = self.lock();
        let state = &mut *state;
        let removed = state.draft.certificates.remove_stored(kind, &mut state.removals);
        if removed {
            debug!(slot = %kind, removals = state.removals.len(), "Stored certificate marked for removal");
        }
        state.revalidate();
        removed
    }

    pub fn clear_certificate(&self, kind: SlotKind) {
        self.edit(|draft| draft.certificates.clear(kind));
    }

    pub fn tenant(&self) -> TenantRef {
        self.lock().tenant.clone()
    }

    pub fn baseline(&self) -> Option<TenantEncryptionInfo> {
        self.lock().baseline.clone()
    }

    pub fn draft(&self) -> EncryptionDraft {
        self.lock().draft.clone()
    }

    pub fn removals(&self) -> RemovalSet {
        self.lock().removals.clone()
    }

    pub fn validation(&self) -> ValidationResult {
        self.lock().validation.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Whether the submit action should be enabled
    pub fn can_submit(&self) -> bool {
        let state = self.lock();
        !state.discarded && !state.submitting && state.validation.is_empty()
    }

    /// Synthesize the pending update without sending it
    pub fn preview(&self) -> Result<EncryptionUpdate> {
        let state = self.lock();
        synthesize(&state.draft, &state.removals)
    }

    /// Drop the draft. Results of in-flight operations are ignored afterwards.
    pub fn discard(&self) {
        let mut state = self.lock();
        state.discarded = true;
        state.draft = EncryptionDraft::default();
        state.removals.clear();
        state.revalidate();
    }

    pub fn is_discarded(&self) -> bool {
        self.lock().discarded
    }
}
