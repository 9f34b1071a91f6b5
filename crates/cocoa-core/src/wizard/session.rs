//! The wizard state machine.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{
    draft::{Criterion, Draft},
    kind::{StepKind, WizardKind, WizardOptions},
    ticket::{CheckTicket, PendingCheck, PendingSubmit, SessionId, SubmitTicket},
};
use crate::{
    error::{FormError, MessageScope, TransitionError},
    models::{Entity, ScopeKey},
    submit::{SubmitFailure, SubmitReport},
    validate::{find_duplicate, CheckOutcome, CheckRequest, DuplicateSource, FieldKey, LengthPolicy},
};

type Transition<T> = std::result::Result<T, TransitionError>;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum WizardState {
    /// Editing, on the given 1-based step
    Step(usize),
    Submitted,
    Cancelled,
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WizardState::Step(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardState::Step(_) => "editing",
            WizardState::Submitted => "submitted",
            WizardState::Cancelled => "cancelled",
        }
    }
}

/// Status of the remote uniqueness check for the draft name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NameCheck {
    /// No check has been issued for the current value
    #[default]
    Unchecked,
    /// A check is in flight
    Pending,
    Unique,
    Duplicate {
        origin: DuplicateSource,
        detail: Option<String>,
    },
    /// The scoped collection could not be read
    Failed { message: String },
}

impl NameCheck {
    pub fn is_unique(&self) -> bool {
        matches!(self, NameCheck::Unique)
    }
}

/// How a submission result was absorbed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResolution {
    /// The ticket no longer matches an open session, e.g. because the
    /// session was cancelled mid-run. Records the backend created anyway are
    /// still handed back.
    Stale { committed: Vec<Entity> },
    /// Every draft was saved and the session is now `Submitted`
    Completed(Vec<Entity>),
    /// Saving stopped at a draft, which is now the current draft
    Failed {
        committed: Vec<Entity>,
        error: FormError,
        /// Step the session was rolled back to
        step: usize,
    },
}

/// One wizard instance: the draft, staged siblings, per-field state, and the
/// current step.
///
/// The session is a plain value. It performs no I/O; work that needs the
/// backend is handed out as [`PendingCheck`]/[`PendingSubmit`] and the result
/// is handed back with the ticket it was issued under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    id: SessionId,
    kind: WizardKind,
    scope: ScopeKey,
    options: WizardOptions,
    state: WizardState,
    draft: Draft,
    staged: Vec<Draft>,
    name_check: NameCheck,
    backend_messages: BTreeMap<FieldKey, Vec<String>>,
    banner: Option<String>,
    committed: Vec<Entity>,
    seq: u64,
    latest_check: Option<u64>,
    in_flight_submit: Option<u64>,
}

impl WizardSession {
    /// Opens a fresh session at step 1.
    pub fn open(kind: WizardKind, scope: ScopeKey) -> Self {
        Self::open_with(kind, scope, WizardOptions::default())
    }

    pub fn open_with(kind: WizardKind, scope: ScopeKey, options: WizardOptions) -> Self {
        let id = SessionId::next();
        debug!("Opened {id} ({kind:?}) in {scope}");
        Self {
            id,
            kind,
            scope,
            options,
            state: WizardState::Step(1),
            draft: Draft::new(),
            staged: Vec::new(),
            name_check: NameCheck::Unchecked,
            backend_messages: BTreeMap::new(),
            banner: None,
            committed: Vec::new(),
            seq: 0,
            latest_check: None,
            in_flight_submit: None,
        }
    }

    /// Opens an edit session seeded from an existing deliverable.
    ///
    /// The name starts unverified; call [`Self::request_name_check`] before
    /// advancing.
    pub fn edit(entity: &Entity, scope: ScopeKey, options: WizardOptions) -> Self {
        let mut session =
            Self::open_with(WizardKind::EditDeliverable { id: entity.id }, scope, options);
        session.draft = Draft::from_entity(entity);
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn staged(&self) -> &[Draft] {
        &self.staged
    }

    pub fn name_check(&self) -> &NameCheck {
        &self.name_check
    }

    /// Message with no more specific place to go.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Records saved by earlier submission attempts of this session.
    pub fn committed(&self) -> &[Entity] {
        &self.committed
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight_submit.is_some()
    }

    pub fn step_count(&self) -> usize {
        self.kind.step_count()
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            WizardState::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn current_step_kind(&self) -> Option<StepKind> {
        self.current_step()
            .and_then(|step| self.kind.steps().get(step - 1).copied())
    }

    fn ensure_open(&self) -> Transition<usize> {
        match self.state {
            WizardState::Step(step) => Ok(step),
            terminal => Err(TransitionError::Closed {
                state: terminal.as_str(),
            }),
        }
    }

    fn ensure_editable(&self) -> Transition<usize> {
        let step = self.ensure_open()?;
        if self.in_flight_submit.is_some() {
            return Err(TransitionError::SubmitInFlight);
        }
        Ok(step)
    }

    // ------------------------------------------------------------------
    // Field edits
    // ------------------------------------------------------------------

    /// Replaces the draft name.
    ///
    /// Returns the remote check to run when the new value passes the local
    /// checks. Any check issued earlier becomes stale.
    pub fn set_name(&mut self, raw: &str) -> Transition<Option<PendingCheck>> {
        self.ensure_editable()?;
        self.draft.name = LengthPolicy::NAME.clamp(raw);
        self.backend_messages.remove(&FieldKey::Name);
        self.banner = None;
        Ok(self.refresh_name_check())
    }

    /// Re-issues the remote check for the current name, e.g. after a failed
    /// read or when an edit session opens.
    pub fn request_name_check(&mut self) -> Transition<Option<PendingCheck>> {
        self.ensure_editable()?;
        Ok(self.refresh_name_check())
    }

    fn refresh_name_check(&mut self) -> Option<PendingCheck> {
        self.seq += 1;
        self.latest_check = None;

        if !self.draft.name_result().is_valid() {
            self.name_check = NameCheck::Unchecked;
            return None;
        }

        let staged = self.staged.iter().map(|draft| draft.name.as_str());
        if let Some(origin) = find_duplicate(&self.draft.name, staged, &[], None) {
            self.name_check = NameCheck::Duplicate {
                origin,
                detail: None,
            };
            return None;
        }

        self.latest_check = Some(self.seq);
        self.name_check = NameCheck::Pending;
        let ticket = CheckTicket {
            session: self.id,
            seq: self.seq,
        };
        debug!("Issued name check {} #{}", ticket.session, ticket.seq);

        Some(PendingCheck {
            ticket,
            request: CheckRequest {
                resource: self.kind.resource(),
                scope: self.scope.clone(),
                candidate: self.draft.name.trim().to_string(),
                staged: self.staged.iter().map(|draft| draft.name.clone()).collect(),
                exclude_id: self.kind.exclude_id(),
            },
        })
    }

    /// Applies a name-check result. Returns `false` (and changes nothing)
    /// when the ticket is stale: another check was issued since, the name
    /// changed, or the session is closed.
    pub fn apply_check(&mut self, ticket: CheckTicket, outcome: CheckOutcome) -> bool {
        if ticket.session != self.id
            || self.state.is_terminal()
            || self.latest_check != Some(ticket.seq)
        {
            debug!(
                "Discarding stale name check {} #{} ({outcome:?})",
                ticket.session, ticket.seq
            );
            return false;
        }

        self.latest_check = None;
        self.name_check = match outcome {
            CheckOutcome::Unique => NameCheck::Unique,
            CheckOutcome::Duplicate(origin) => NameCheck::Duplicate {
                origin,
                detail: None,
            },
            CheckOutcome::Failed(message) => NameCheck::Failed { message },
        };
        true
    }

    pub fn set_description(&mut self, raw: &str) -> Transition<()> {
        self.ensure_editable()?;
        self.draft.description = LengthPolicy::DESCRIPTION.clamp(raw);
        self.backend_messages.remove(&FieldKey::Description);
        self.banner = None;
        Ok(())
    }

    pub fn set_criterion(&mut self, index: usize, raw: &str) -> Transition<()> {
        self.ensure_editable()?;
        let criterion = self
            .draft
            .criteria
            .get_mut(index)
            .ok_or(TransitionError::NoSuchCriterion { index })?;
        criterion.text = LengthPolicy::CRITERION.clamp(raw);
        self.backend_messages.remove(&FieldKey::Criterion(index));
        self.backend_messages.remove(&FieldKey::Criteria);
        self.banner = None;
        Ok(())
    }

    /// Appends an empty criterion entry and returns its index.
    pub fn add_criterion(&mut self) -> Transition<usize> {
        self.ensure_editable()?;
        self.draft.criteria.push(Criterion::default());
        self.backend_messages.remove(&FieldKey::Criteria);
        Ok(self.draft.criteria.len() - 1)
    }

    pub fn remove_criterion(&mut self, index: usize) -> Transition<Criterion> {
        self.ensure_editable()?;
        if index >= self.draft.criteria.len() {
            return Err(TransitionError::NoSuchCriterion { index });
        }
        // Indexes shift, so per-criterion backend messages no longer line up.
        self.clear_criteria_messages();
        Ok(self.draft.criteria.remove(index))
    }

    fn clear_criteria_messages(&mut self) {
        self.backend_messages.retain(|field, _| !field.is_criteria());
    }

    // ------------------------------------------------------------------
    // Validity
    // ------------------------------------------------------------------

    /// Replaces local errors of fields that carry backend messages with
    /// those messages.
    fn merge_backend(&self, local: Vec<FormError>, criteria: bool) -> Vec<FormError> {
        let mut errors: Vec<FormError> = local
            .into_iter()
            .filter(|error| {
                error
                    .field()
                    .map_or(true, |field| !self.backend_messages.contains_key(&field))
            })
            .collect();

        for (field, messages) in &self.backend_messages {
            if field.is_criteria() == criteria {
                errors.push(FormError::BackendValidation {
                    message: messages.join("; "),
                    fields: BTreeMap::from([(field.wire_name(), messages.clone())]),
                });
            }
        }
        errors
    }

    fn name_check_error(&self) -> Option<FormError> {
        if self.backend_messages.contains_key(&FieldKey::Name) {
            return None;
        }
        match &self.name_check {
            NameCheck::Duplicate { origin, detail } => Some(FormError::Duplicate {
                field: FieldKey::Name,
                origin: *origin,
                detail: detail.clone(),
            }),
            NameCheck::Failed { message } => Some(FormError::Transport {
                message: message.clone(),
            }),
            NameCheck::Unchecked | NameCheck::Pending | NameCheck::Unique => None,
        }
    }

    /// Errors that block leaving `step` (1-based). Unknown steps have none.
    pub fn step_errors(&self, step: usize) -> Vec<FormError> {
        let Some(kind) = step.checked_sub(1).and_then(|i| self.kind.steps().get(i)) else {
            return Vec::new();
        };

        match kind {
            StepKind::Details => {
                let mut errors = self.merge_backend(self.draft.details_errors(), false);
                errors.extend(self.name_check_error());
                errors
            }
            StepKind::Criteria => self.merge_backend(self.draft.criteria_errors(), true),
            StepKind::Review => self
                .staged
                .iter()
                .flat_map(Draft::local_errors)
                .collect(),
        }
    }

    /// Every error in the session, across all steps.
    pub fn submit_errors(&self) -> Vec<FormError> {
        (1..=self.step_count())
            .flat_map(|step| self.step_errors(step))
            .collect()
    }

    /// Whether `step` can be left forward right now.
    pub fn step_is_valid(&self, step: usize) -> bool {
        let needs_name = self.kind.steps().get(step.wrapping_sub(1)) == Some(&StepKind::Details);
        self.step_errors(step).is_empty() && (!needs_name || self.name_check.is_unique())
    }

    /// Aggregate validity, derived from the constituent results on every
    /// call: all fields and criteria valid, no duplicate, name check resolved
    /// as unique, every staged draft valid, and nothing in flight.
    pub fn can_submit(&self) -> bool {
        !self.state.is_terminal()
            && self.in_flight_submit.is_none()
            && self.name_check.is_unique()
            && self.submit_errors().is_empty()
    }

    /// Messages for the current draft keyed by field, backend messages
    /// taking precedence over local ones.
    pub fn field_messages(&self) -> BTreeMap<FieldKey, Vec<String>> {
        let mut messages: BTreeMap<FieldKey, Vec<String>> = BTreeMap::new();
        let errors = self
            .merge_backend(self.draft.details_errors(), false)
            .into_iter()
            .chain(self.name_check_error())
            .chain(self.merge_backend(self.draft.criteria_errors(), true));

        for error in errors {
            for (field, texts) in error.field_messages() {
                messages.entry(field).or_default().extend(texts);
            }
        }
        messages
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Moves forward one step when the current step is valid.
    pub fn next(&mut self) -> Transition<usize> {
        let step = self.ensure_editable()?;
        if step >= self.step_count() {
            return Err(TransitionError::AtLastStep { step });
        }

        let errors = self.step_errors(step);
        if !errors.is_empty() {
            return Err(TransitionError::StepInvalid { step, errors });
        }
        if self.kind.steps()[step - 1] == StepKind::Details && !self.name_check.is_unique() {
            return Err(TransitionError::NameUnverified);
        }

        self.state = WizardState::Step(step + 1);
        Ok(step + 1)
    }

    /// Moves back one step. Never revalidates. A no-op on step 1.
    pub fn back(&mut self) -> Transition<usize> {
        let step = self.ensure_editable()?;
        if step == 1 {
            return Ok(1);
        }
        Ok(self.move_back_to(step - 1))
    }

    /// Jumps back to an earlier (or the current) step.
    pub fn back_to(&mut self, target: usize) -> Transition<usize> {
        let step = self.ensure_editable()?;
        if target == 0 || target > step {
            return Err(TransitionError::InvalidStep { step: target });
        }
        Ok(self.move_back_to(target))
    }

    fn move_back_to(&mut self, target: usize) -> usize {
        if target == 1 && self.options.reset_criteria_on_back {
            self.draft.criteria = vec![Criterion::default()];
            self.clear_criteria_messages();
        }
        self.state = WizardState::Step(target);
        target
    }

    /// Discards the session. Returns `false` if it had already ended.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        debug!("Cancelled {}", self.id);
        self.state = WizardState::Cancelled;
        self.latest_check = None;
        self.in_flight_submit = None;
        self.draft = Draft::new();
        self.staged.clear();
        true
    }

    // ------------------------------------------------------------------
    // Staging
    // ------------------------------------------------------------------

    /// Moves the current draft into the staged list and starts a new draft at
    /// step 1. Returns the number of staged drafts.
    pub fn stage_current(&mut self) -> Transition<usize> {
        let step = self.ensure_editable()?;
        if !self.kind.supports_staging() {
            return Err(TransitionError::StagingUnsupported);
        }
        if self.kind.steps().get(step - 1) != Some(&StepKind::Review) {
            return Err(TransitionError::NotOnReviewStep);
        }

        let mut errors = self.step_errors(self.kind.step_of(StepKind::Details).unwrap_or(1));
        if let Some(criteria_step) = self.kind.step_of(StepKind::Criteria) {
            errors.extend(self.step_errors(criteria_step));
        }
        if !errors.is_empty() {
            return Err(TransitionError::CannotSubmit { errors });
        }
        if !self.name_check.is_unique() {
            return Err(TransitionError::NameUnverified);
        }

        self.staged.push(std::mem::take(&mut self.draft));
        self.name_check = NameCheck::Unchecked;
        self.latest_check = None;
        self.backend_messages.clear();
        self.banner = None;
        self.state = WizardState::Step(1);
        Ok(self.staged.len())
    }

    /// Drops a staged draft and returns it.
    ///
    /// If the current name was only blocked by that draft, the name check is
    /// reset to unchecked and must be requested again.
    pub fn remove_staged(&mut self, index: usize) -> Transition<Draft> {
        self.ensure_editable()?;
        if index >= self.staged.len() {
            return Err(TransitionError::NoSuchStaged { index });
        }
        let removed = self.staged.remove(index);
        if matches!(
            self.name_check,
            NameCheck::Duplicate {
                origin: DuplicateSource::Staged,
                ..
            }
        ) {
            self.name_check = NameCheck::Unchecked;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Starts a submission from the last step when the whole session is
    /// valid. The session accepts no edits until [`Self::finish_submit`].
    pub fn begin_submit(&mut self) -> Transition<PendingSubmit> {
        let step = self.ensure_editable()?;
        let last = self.step_count();
        if step != last {
            return Err(TransitionError::NotLastStep { step, last });
        }

        let errors = self.submit_errors();
        if !errors.is_empty() {
            return Err(TransitionError::CannotSubmit { errors });
        }
        if !self.name_check.is_unique() {
            return Err(TransitionError::NameUnverified);
        }

        self.seq += 1;
        self.in_flight_submit = Some(self.seq);
        self.banner = None;

        let payloads = self
            .staged
            .iter()
            .chain(std::iter::once(&self.draft))
            .map(|draft| draft.to_payload(&self.scope))
            .collect();

        Ok(PendingSubmit {
            ticket: SubmitTicket {
                session: self.id,
                seq: self.seq,
            },
            resource: self.kind.resource(),
            target: self.kind.target(),
            payloads,
        })
    }

    /// Absorbs the result of a submission started with
    /// [`Self::begin_submit`].
    ///
    /// On failure the drafts saved before the failing one leave the session,
    /// the failing draft becomes the current draft with the error mapped onto
    /// its fields, and the session returns to the step that owns the failing
    /// field.
    pub fn finish_submit(&mut self, ticket: SubmitTicket, report: SubmitReport) -> SubmitResolution {
        if ticket.session != self.id
            || self.state.is_terminal()
            || self.in_flight_submit != Some(ticket.seq)
        {
            debug!(
                "Discarding stale submission result {} #{} ({} record(s) saved)",
                ticket.session,
                ticket.seq,
                report.created.len()
            );
            if ticket.session == self.id {
                self.committed.extend(report.created.iter().cloned());
            }
            return SubmitResolution::Stale {
                committed: report.created,
            };
        }

        self.in_flight_submit = None;
        self.committed.extend(report.created.iter().cloned());

        let Some(SubmitFailure { index, error }) = report.failure else {
            info!("{} saved {} record(s)", self.id, report.created.len());
            self.state = WizardState::Submitted;
            return SubmitResolution::Completed(report.created);
        };

        if index < self.staged.len() {
            let mut remaining = self.staged.split_off(index);
            let failing = remaining.remove(0);
            let current = std::mem::replace(&mut self.draft, failing);
            remaining.push(current);
            self.staged = remaining;
        } else {
            self.staged.clear();
        }

        self.absorb_error(&error);
        let step = self.rollback_step(&error);
        self.state = WizardState::Step(step);

        SubmitResolution::Failed {
            committed: report.created,
            error,
            step,
        }
    }

    fn absorb_error(&mut self, error: &FormError) {
        self.backend_messages.clear();
        self.banner = None;
        // Every draft reaching the backend had a unique name when it was
        // checked; only a conflict reported now changes that.
        self.name_check = NameCheck::Unique;
        self.latest_check = None;

        match error {
            FormError::Duplicate { origin, detail, .. } => {
                self.name_check = NameCheck::Duplicate {
                    origin: *origin,
                    detail: detail.clone(),
                };
            }
            FormError::BackendValidation { message, .. } => {
                let criteria = self.draft.criteria.len();
                let (placed, unplaced): (BTreeMap<_, _>, BTreeMap<_, _>) = error
                    .field_messages()
                    .into_iter()
                    .partition(|(field, _)| match field {
                        FieldKey::Criterion(index) => *index < criteria,
                        _ => true,
                    });
                self.backend_messages = placed;

                // Messages for criteria the draft does not have cannot be
                // cleared by editing, so they go to the banner.
                let stray: Vec<String> = unplaced.into_values().flatten().collect();
                if self.backend_messages.is_empty() {
                    self.banner = Some(message.clone());
                } else if !stray.is_empty() {
                    self.banner = Some(stray.join("; "));
                }
            }
            FormError::Transport { message } => {
                self.banner = Some(message.clone());
            }
            FormError::LocalValidation { .. } => {}
        }
    }

    fn rollback_step(&self, error: &FormError) -> usize {
        let last = self.step_count();
        let target = match error.scope() {
            MessageScope::Field(field) if field.is_criteria() => StepKind::Criteria,
            MessageScope::Field(_) => StepKind::Details,
            MessageScope::Step => StepKind::Criteria,
            MessageScope::Banner => return last,
        };
        self.kind.step_of(target).unwrap_or(last)
    }
}
