//! Wizard state as a markdown report.

use std::fmt;

use crate::wizard::{NameCheck, WizardKind, WizardSession, WizardState};

/// Renders the current step, the draft, its problems and staged siblings.
pub struct WizardReport<'a>(pub &'a WizardSession);

fn title(kind: WizardKind) -> &'static str {
    match kind {
        WizardKind::Deliverable => "New deliverables",
        WizardKind::Objective => "New objective",
        WizardKind::EditDeliverable { .. } => "Edit deliverable",
    }
}

impl fmt::Display for NameCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameCheck::Unchecked => write!(f, "not checked"),
            NameCheck::Pending => write!(f, "checking"),
            NameCheck::Unique => write!(f, "available"),
            NameCheck::Duplicate { origin, detail } => match detail {
                Some(detail) => write!(f, "{detail}"),
                None => write!(f, "{origin}"),
            },
            NameCheck::Failed { message } => write!(f, "{message}"),
        }
    }
}

impl fmt::Display for WizardReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.0;
        let draft = session.draft();

        write!(f, "## {}", title(session.kind()))?;
        match (session.state(), session.current_step_kind()) {
            (WizardState::Step(step), Some(kind)) => writeln!(
                f,
                " (step {step} of {}: {kind})",
                session.step_count()
            )?,
            (state, _) => writeln!(f, " ({})", state.as_str())?,
        }
        writeln!(f)?;

        if let Some(banner) = session.banner() {
            writeln!(f, "> {banner}")?;
            writeln!(f)?;
        }

        writeln!(f, "- Name: {} ({})", draft.name.trim(), session.name_check())?;
        if !draft.description.trim().is_empty() {
            writeln!(f, "- Description: {}", draft.description.trim())?;
        }
        writeln!(f, "- Scope: {}", session.scope())?;

        writeln!(f)?;
        writeln!(f, "**Acceptance criteria:**")?;
        for (index, criterion) in draft.criteria.iter().enumerate() {
            writeln!(f, "{}. {}", index + 1, criterion.text.trim())?;
        }

        let messages = session.field_messages();
        if !messages.is_empty() {
            writeln!(f)?;
            writeln!(f, "**Problems:**")?;
            for (field, texts) in &messages {
                for text in texts {
                    writeln!(f, "- {field}: {text}")?;
                }
            }
        }

        if !session.staged().is_empty() {
            writeln!(f)?;
            writeln!(f, "**Staged:**")?;
            for (index, staged) in session.staged().iter().enumerate() {
                writeln!(f, "{}. {}", index + 1, staged.name.trim())?;
            }
        }

        if !session.state().is_terminal() {
            writeln!(f)?;
            writeln!(
                f,
                "Ready to submit: {}",
                if session.can_submit() { "yes" } else { "no" }
            )?;
        }
        Ok(())
    }
}
