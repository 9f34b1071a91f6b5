//! Wizard flavours and their step layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{models::Resource, submit::SubmitTarget};

/// What a step of the wizard edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Name and description
    Details,
    /// Acceptance criteria
    Criteria,
    /// Staged drafts, before submission
    Review,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Details => write!(f, "Details"),
            StepKind::Criteria => write!(f, "Criteria"),
            StepKind::Review => write!(f, "Review"),
        }
    }
}

const THREE_STEPS: &[StepKind] = &[StepKind::Details, StepKind::Criteria, StepKind::Review];
const TWO_STEPS: &[StepKind] = &[StepKind::Details, StepKind::Criteria];

/// The three wizard flows of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardKind {
    /// Register one or more deliverables under an objective
    Deliverable,
    /// Create an objective
    Objective,
    /// Edit an existing deliverable
    EditDeliverable { id: u64 },
}

impl WizardKind {
    /// Steps in order; step numbers are 1-based indexes into this slice.
    pub fn steps(&self) -> &'static [StepKind] {
        match self {
            WizardKind::Deliverable => THREE_STEPS,
            WizardKind::Objective | WizardKind::EditDeliverable { .. } => TWO_STEPS,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// 1-based number of the first step of the given kind.
    pub fn step_of(&self, kind: StepKind) -> Option<usize> {
        self.steps()
            .iter()
            .position(|step| *step == kind)
            .map(|index| index + 1)
    }

    pub fn resource(&self) -> Resource {
        match self {
            WizardKind::Deliverable | WizardKind::EditDeliverable { .. } => Resource::Deliverable,
            WizardKind::Objective => Resource::Objective,
        }
    }

    pub fn target(&self) -> SubmitTarget {
        match self {
            WizardKind::EditDeliverable { id } => SubmitTarget::Update { id: *id },
            _ => SubmitTarget::Create,
        }
    }

    /// Whether several drafts can be staged and submitted together.
    pub fn supports_staging(&self) -> bool {
        matches!(self, WizardKind::Deliverable)
    }

    /// Record to leave out of the name check.
    pub fn exclude_id(&self) -> Option<u64> {
        match self {
            WizardKind::EditDeliverable { id } => Some(*id),
            _ => None,
        }
    }
}

/// Behaviour switches for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardOptions {
    /// Clear the criteria back to a single empty entry whenever navigation
    /// returns to the first step. Off by default; kept only for flows that
    /// depend on the old behaviour.
    pub reset_criteria_on_back: bool,
}
