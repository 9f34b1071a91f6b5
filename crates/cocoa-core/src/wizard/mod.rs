//! Multi-step creation and edit wizards.
//!
//! A wizard collects one record (or, for deliverables, several staged
//! records) across a fixed sequence of steps and submits them to the backend.
//!
//! ```text
//! ┌──────────┐  next   ┌──────────┐  next   ┌──────────┐  submit  ┌───────────┐
//! │ Details  │───────▶│ Criteria │───────▶│  Review  │────────▶│ Submitted │
//! │ (step 1) │◀───────│ (step 2) │◀───────│ (step 3) │          └───────────┘
//! └──────────┘  back   └──────────┘  back   └──────────┘
//!       ▲                                        │ stage_current
//!       └────────────────────────────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`draft`]: the record being composed and its local checks
//! - [`kind`]: the wizard flavours and their step layouts
//! - [`session`]: the synchronous state machine
//! - [`ticket`]: identity tags that keep late async results out
//! - [`controller`]: the async driver that debounces name checks and runs
//!   submissions
//!
//! ## Rules
//!
//! 1. Moving forward requires the current step to be valid; moving back never
//!    revalidates.
//! 2. Submission is only possible from the last step, with every field valid
//!    and the name confirmed unique.
//! 3. Whether the session can submit is computed from the field results on
//!    every call; it is never stored.
//! 4. A result is applied only while its ticket is the newest one the session
//!    issued.
//!
//! # Example
//!
//! ```rust
//! use cocoa_core::{
//!     models::ScopeKey,
//!     validate::CheckOutcome,
//!     wizard::{WizardKind, WizardSession},
//! };
//!
//! let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
//! let pending = session.set_name("Mejorar la cobertura")?.expect("name is locally valid");
//! assert!(session.apply_check(pending.ticket, CheckOutcome::Unique));
//! assert_eq!(session.next()?, 2);
//!
//! session.set_criterion(0, "Cobertura mayor al 80%")?;
//! assert!(session.can_submit());
//! # Ok::<(), cocoa_core::error::TransitionError>(())
//! ```

pub mod controller;
pub mod draft;
pub mod kind;
pub mod session;
pub mod ticket;

#[cfg(test)]
mod tests;

pub use controller::WizardController;
pub use draft::{Criterion, Draft};
pub use kind::{StepKind, WizardKind, WizardOptions};
pub use session::{NameCheck, SubmitResolution, WizardSession, WizardState};
pub use ticket::{CheckTicket, PendingCheck, PendingSubmit, SessionId, SubmitTicket};
