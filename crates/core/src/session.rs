//! Caller-owned lifecycle of a translation request.
//!
//! A session accepts one submission at a time and walks
//! `Idle -> Pending -> {Succeeded, Failed}`. Settled phases accept the next
//! submission just like `Idle`; a submission made while `Pending` is rejected
//! with [`SessionError::Busy`] instead of being queued.

use crate::config::TargetLang;
use crate::translate::{
    ChatBackend, FailureReason, TranslateError, Translation, TranslationClient, TranslationRequest,
};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_pending(self) -> bool {
        matches!(self, Phase::Pending)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("a translation is already in progress")]
    Busy,

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl SessionError {
    /// `None` for [`SessionError::Busy`], which is a caller error rather than a translation outcome.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            SessionError::Busy => None,
            SessionError::Translate(e) => Some(e.reason()),
        }
    }
}

pub struct TranslationSession<B> {
    client: TranslationClient<B>,
    target_lang: TargetLang,
    phase: Mutex<Phase>,
}

impl<B: ChatBackend> TranslationSession<B> {
    pub fn new(client: TranslationClient<B>, target_lang: TargetLang) -> Self {
        Self {
            client,
            target_lang,
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn client(&self) -> &TranslationClient<B> {
        &self.client
    }

    pub fn target_lang(&self) -> &TargetLang {
        &self.target_lang
    }

    pub fn phase(&self) -> Phase {
        *self.lock_phase()
    }

    pub async fn submit(&self, text: &str) -> Result<Translation, SessionError> {
        let request = TranslationRequest::new(text, self.target_lang.clone())?;

        let guard = self.begin()?;
        let outcome = self.client.execute(request).await;
        guard.settle(if outcome.is_ok() {
            Phase::Succeeded
        } else {
            Phase::Failed
        });

        Ok(outcome?)
    }

    fn begin(&self) -> Result<PendingGuard<'_>, SessionError> {
        let mut phase = self.lock_phase();
        if phase.is_pending() {
            tracing::debug!("rejecting submission while a translation is pending");
            return Err(SessionError::Busy);
        }
        *phase = Phase::Pending;
        Ok(PendingGuard {
            phase: &self.phase,
            settled: false,
        })
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        // The lock is never held across an await, so poisoning only follows a
        // panic elsewhere; the phase value itself is still meaningful.
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns the session to `Idle` if the in-flight future is dropped before settling.
struct PendingGuard<'a> {
    phase: &'a Mutex<Phase>,
    settled: bool,
}

impl PendingGuard<'_> {
    fn settle(mut self, outcome: Phase) {
        self.store(outcome);
        self.settled = true;
    }

    fn store(&self, value: Phase) {
        let mut phase = self.phase.lock().unwrap_or_else(|p| p.into_inner());
        *phase = value;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store(Phase::Idle);
        }
    }
}
