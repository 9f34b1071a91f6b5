//! Core library for the Cocoa project dashboard wizards.
//!
//! This crate validates and submits the records a project dashboard creates
//! through multi-step wizards: deliverables (several at once), objectives,
//! and edits of existing deliverables. It owns the client-side rules (length
//! limits, uniqueness within a scope), the wizard state machine, and the
//! submission protocol against an external REST backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   validate/     │    │    wizard/      │    │    backend/     │
//! │ (length rules,  │───▶│ (session state, │───▶│ (Backend trait, │
//! │  duplicates)    │    │  controller)    │    │  HttpBackend)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`validate`]: pure field checks and name-collision detection
//! - [`wizard`]: the session state machine and its async controller
//! - [`submit`]: sequential, stop-at-first-failure submission
//! - [`backend`]: the REST seam and failure classification
//! - [`display`]: markdown formatting of records and outcomes
//! - [`config`]: settings from defaults, file, environment and flags
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cocoa_core::{
//!     config::SettingsBuilder,
//!     models::ScopeKey,
//!     wizard::{SubmitResolution, WizardController, WizardKind},
//!     HttpBackend,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsBuilder::new().build()?;
//! let backend = Arc::new(HttpBackend::new(&settings)?);
//!
//! let wizard = WizardController::open(
//!     backend,
//!     WizardKind::Objective,
//!     ScopeKey::Project(1),
//!     &settings,
//! );
//! wizard.set_name("Mejorar la cobertura").await?;
//! wizard.next().await?;
//! wizard.set_criterion(0, "Cobertura mayor al 80%").await?;
//!
//! if let SubmitResolution::Completed(saved) = wizard.submit().await? {
//!     println!("Saved {}", saved[0]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod submit;
pub mod validate;
pub mod wizard;

// Re-export commonly used types
pub use backend::{Backend, BackendFailure, HttpBackend};
pub use config::{Settings, SettingsBuilder};
pub use display::{Entities, OperationStatus, SubmitSummary, WizardReport};
pub use error::{CocoaError, FormError, Result, TransitionError};
pub use models::{Entity, Resource, ScopeKey};
pub use params::{DraftInput, EntityPayload};
pub use submit::{submit_all, SubmitReport, SubmitTarget};
pub use validate::{FieldKey, LengthPolicy, ValidationResult};
pub use wizard::{WizardController, WizardKind, WizardSession};
