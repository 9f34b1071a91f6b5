//! The seam between the wizard and the external REST backend.
//!
//! Everything the wizard needs from the backend goes through the [`Backend`]
//! trait: read a scoped collection, create a record, update a record. Every
//! call returns `Result<_, BackendFailure>`, so an error body can never be
//! mistaken for a success body.
//!
//! [`HttpBackend`] is the production implementation over `reqwest`. Tests
//! substitute an in-memory implementation.

pub mod failure;
pub mod http;

use async_trait::async_trait;

pub use failure::{classify_failure, BackendFailure, GENERIC_REJECTION};
pub use http::HttpBackend;

use crate::{
    models::{Entity, Resource, ScopeKey},
    params::EntityPayload,
};

/// Operations the wizard performs against the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Lists the records of `resource` within `scope`. An empty list is a
    /// valid answer.
    async fn list_scoped(
        &self,
        resource: Resource,
        scope: &ScopeKey,
    ) -> Result<Vec<Entity>, BackendFailure>;

    /// Creates a record and returns it with its server-assigned identifiers.
    async fn create(
        &self,
        resource: Resource,
        payload: &EntityPayload,
    ) -> Result<Entity, BackendFailure>;

    /// Replaces the record `id` with `payload`.
    async fn update(
        &self,
        resource: Resource,
        id: u64,
        payload: &EntityPayload,
    ) -> Result<Entity, BackendFailure>;
}
