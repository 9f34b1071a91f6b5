//! Markdown formatting for records, submission outcomes and wizard state.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes are wrapped in newtypes so the same
//! data can be rendered differently depending on context. Every formatter
//! produces markdown, which the CLI renders for the terminal.
//!
//! ## Module Organization
//!
//! - [`collections`]: collection wrappers ([`Entities`])
//! - [`results`]: submission outcomes ([`SubmitSummary`])
//! - [`session`]: wizard state as a step-by-step report ([`WizardReport`])
//! - [`status`]: one-line confirmations ([`OperationStatus`])
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use cocoa_core::{display::Entities, models::{Entity, Resource}};
//!
//! let entities = Entities::new(
//!     Resource::Deliverable,
//!     vec![Entity {
//!         id: 7,
//!         name: "Reporte Semanal".to_string(),
//!         description: None,
//!         criteria: vec![],
//!         scope_key: Some("objective:3".to_string()),
//!     }],
//! );
//! assert!(entities.to_string().contains("Reporte Semanal"));
//! ```

pub mod collections;
pub mod models;
pub mod results;
pub mod session;
pub mod status;

pub use collections::Entities;
pub use results::SubmitSummary;
pub use session::WizardReport;
pub use status::OperationStatus;
