//! Data models for the records the dashboard reads from and writes to the
//! backend.
//!
//! The backend is the source of truth for every persisted record. These types
//! describe only the fields the wizard controller needs: the identifier, the
//! name that must be unique within a scope, and the attached criteria. Any
//! other field the backend returns is ignored on deserialization.
//!
//! Display implementations for these models live in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use cocoa_core::models::{Entity, Resource, ScopeKey};
//!
//! let scope = ScopeKey::Objective(3);
//! assert_eq!(scope.to_string(), "objective:3");
//! assert_eq!(Resource::Deliverable.collection(), "deliverables");
//!
//! let entity: Entity = serde_json::from_str(
//!     r#"{"id": 7, "name": "Reporte Semanal", "criteria": [], "owner": "ana"}"#,
//! ).unwrap();
//! assert_eq!(entity.id, 7);
//! ```

pub mod entity;
pub mod resource;
pub mod scope;


pub use entity::{CriterionRecord, Entity};
pub use resource::Resource;
pub use scope::ScopeKey;
