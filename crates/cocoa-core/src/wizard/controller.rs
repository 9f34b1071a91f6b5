//! Async driver for a [`WizardSession`].

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, warn};
use tokio::{sync::Mutex, task::JoinHandle};

use super::{
    draft::Criterion,
    kind::{WizardKind, WizardOptions},
    session::{NameCheck, SubmitResolution, WizardSession},
    ticket::PendingCheck,
};
use crate::{
    backend::Backend,
    config::{Settings, DEFAULT_DEBOUNCE},
    error::Result,
    models::{Entity, ScopeKey},
    submit::submit_while,
    validate::DuplicateChecker,
};

/// Runs a wizard session against a backend.
///
/// Name checks are debounced: each name edit aborts the check scheduled by
/// the previous edit, and only the newest check's result is applied. The
/// session lock is never held while a request is in flight.
///
/// Lock order is `check_task` before `session`.
pub struct WizardController<B: Backend + 'static> {
    backend: Arc<B>,
    session: Arc<Mutex<WizardSession>>,
    debounce: Duration,
    check_task: Mutex<Option<JoinHandle<()>>>,
    cancelled: AtomicBool,
}

impl<B: Backend + 'static> WizardController<B> {
    pub fn new(backend: Arc<B>, session: WizardSession) -> Self {
        Self {
            backend,
            session: Arc::new(Mutex::new(session)),
            debounce: DEFAULT_DEBOUNCE,
            check_task: Mutex::new(None),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Opens a fresh session of `kind` in `scope`.
    pub fn open(backend: Arc<B>, kind: WizardKind, scope: ScopeKey, settings: &Settings) -> Self {
        Self::new(backend, WizardSession::open(kind, scope)).with_debounce(settings.debounce)
    }

    /// Opens an edit session for `entity` and schedules the initial name
    /// check.
    pub async fn edit(
        backend: Arc<B>,
        entity: &Entity,
        scope: ScopeKey,
        options: WizardOptions,
        settings: &Settings,
    ) -> Result<Self> {
        let controller = Self::new(backend, WizardSession::edit(entity, scope, options))
            .with_debounce(settings.debounce);
        controller.request_name_check().await?;
        Ok(controller)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// A copy of the current session state.
    pub async fn snapshot(&self) -> WizardSession {
        self.session.lock().await.clone()
    }

    pub async fn can_submit(&self) -> bool {
        self.session.lock().await.can_submit()
    }

    pub async fn name_check(&self) -> NameCheck {
        self.session.lock().await.name_check().clone()
    }

    /// Replaces the draft name and schedules a debounced uniqueness check.
    pub async fn set_name(&self, raw: &str) -> Result<()> {
        let mut slot = self.check_task.lock().await;
        let pending = self.session.lock().await.set_name(raw)?;
        self.schedule(&mut slot, pending);
        Ok(())
    }

    /// Schedules a check for the current name, e.g. after a failed read.
    pub async fn request_name_check(&self) -> Result<()> {
        let mut slot = self.check_task.lock().await;
        let pending = self.session.lock().await.request_name_check()?;
        self.schedule(&mut slot, pending);
        Ok(())
    }

    /// Replaces the scheduled check. The caller holds the `check_task` guard
    /// from before the ticket was issued until the task is stored, so tasks
    /// are stored in ticket order.
    fn schedule(&self, slot: &mut Option<JoinHandle<()>>, pending: Option<PendingCheck>) {
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let Some(PendingCheck { ticket, request }) = pending else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let session = Arc::clone(&self.session);
        let debounce = self.debounce;

        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let outcome = DuplicateChecker::new(backend.as_ref()).check(&request).await;
            if !session.lock().await.apply_check(ticket, outcome) {
                debug!("Name check {} #{} arrived too late", ticket.session, ticket.seq);
            }
        }));
    }

    /// Waits for the scheduled name check, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.check_task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Name check task failed: {e}");
                }
            }
        }
    }

    pub async fn set_description(&self, raw: &str) -> Result<()> {
        Ok(self.session.lock().await.set_description(raw)?)
    }

    pub async fn set_criterion(&self, index: usize, raw: &str) -> Result<()> {
        Ok(self.session.lock().await.set_criterion(index, raw)?)
    }

    pub async fn add_criterion(&self) -> Result<usize> {
        Ok(self.session.lock().await.add_criterion()?)
    }

    pub async fn remove_criterion(&self, index: usize) -> Result<Criterion> {
        Ok(self.session.lock().await.remove_criterion(index)?)
    }

    /// Advances one step. A pending name check is awaited first so the step
    /// is judged on its result.
    pub async fn next(&self) -> Result<usize> {
        self.settle().await;
        Ok(self.session.lock().await.next()?)
    }

    pub async fn back(&self) -> Result<usize> {
        Ok(self.session.lock().await.back()?)
    }

    pub async fn back_to(&self, step: usize) -> Result<usize> {
        Ok(self.session.lock().await.back_to(step)?)
    }

    /// Stages the current draft and starts a new one.
    pub async fn stage_current(&self) -> Result<usize> {
        self.settle().await;
        Ok(self.session.lock().await.stage_current()?)
    }

    /// Drops a staged draft; re-checks the current name if that draft was
    /// what blocked it.
    pub async fn remove_staged(&self, index: usize) -> Result<()> {
        let mut slot = self.check_task.lock().await;
        let pending = {
            let mut session = self.session.lock().await;
            session.remove_staged(index)?;
            if *session.name_check() == NameCheck::Unchecked {
                session.request_name_check()?
            } else {
                None
            }
        };
        if pending.is_some() {
            self.schedule(&mut slot, pending);
        }
        Ok(())
    }

    /// Submits every staged draft and then the current one.
    ///
    /// A [`Self::cancel`] during the run stops it before the next draft is
    /// sent; records saved up to then come back in
    /// [`SubmitResolution::Stale`].
    pub async fn submit(&self) -> Result<SubmitResolution> {
        self.settle().await;
        let pending = self.session.lock().await.begin_submit()?;

        let report = submit_while(
            self.backend.as_ref(),
            pending.resource,
            pending.target,
            &pending.payloads,
            || !self.cancelled.load(Ordering::Acquire),
        )
        .await;

        let resolution = self.session.lock().await.finish_submit(pending.ticket, report);
        if let SubmitResolution::Stale { committed } = &resolution {
            warn!(
                "Session {} closed while saving; {} record(s) were saved before it stopped",
                pending.ticket.session,
                committed.len()
            );
        }
        Ok(resolution)
    }

    /// Ends the session, drops any scheduled name check, and stops a running
    /// submission before its next draft. Returns `false` if the session had
    /// already ended.
    pub async fn cancel(&self) -> bool {
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.check_task.lock().await.take() {
            handle.abort();
        }
        self.session.lock().await.cancel()
    }
}
