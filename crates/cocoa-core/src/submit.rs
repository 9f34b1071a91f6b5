//! Sequential submission of validated drafts.
//!
//! Drafts are sent one request at a time, in order. The first failure stops
//! the run: records created before it stay committed (there is no
//! compensation), the failing item's error is reported, and later items are
//! never sent. A run can also be interrupted between items, in which case the
//! remaining items are skipped without an error.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    backend::Backend,
    error::FormError,
    models::{Entity, Resource},
    params::EntityPayload,
};

/// Whether payloads create new records or replace an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubmitTarget {
    Create,
    Update { id: u64 },
}

/// The item that stopped a submission run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitFailure {
    /// Position of the failing payload in the submitted list
    pub index: usize,
    pub error: FormError,
}

/// What a submission run achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReport {
    /// Records committed by the backend, in submission order
    pub created: Vec<Entity>,
    pub failure: Option<SubmitFailure>,
    /// Payloads after the failure or interruption that were never sent
    pub skipped: usize,
    /// The run was stopped between items rather than by a failure
    #[serde(default)]
    pub interrupted: bool,
}

impl SubmitReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.interrupted
    }
}

/// Sends `payloads` one by one and stops at the first failure.
///
/// Never returns an error: every backend failure is translated into a
/// [`FormError`] inside the report.
pub async fn submit_all<B: Backend + ?Sized>(
    backend: &B,
    resource: Resource,
    target: SubmitTarget,
    payloads: &[EntityPayload],
) -> SubmitReport {
    submit_while(backend, resource, target, payloads, || true).await
}

/// Like [`submit_all`], but asks `keep_going` before sending each payload and
/// stops as soon as it returns `false`. A request already in flight is
/// allowed to finish and its record is reported.
pub async fn submit_while<B, F>(
    backend: &B,
    resource: Resource,
    target: SubmitTarget,
    payloads: &[EntityPayload],
    mut keep_going: F,
) -> SubmitReport
where
    B: Backend + ?Sized,
    F: FnMut() -> bool,
{
    let mut report = SubmitReport::default();

    for (index, payload) in payloads.iter().enumerate() {
        if !keep_going() {
            info!(
                "Saving {resource}s interrupted after {index} of {}",
                payloads.len()
            );
            report.interrupted = true;
            report.skipped = payloads.len() - index;
            break;
        }

        let result = match target {
            SubmitTarget::Create => backend.create(resource, payload).await,
            SubmitTarget::Update { id } => backend.update(resource, id, payload).await,
        };

        match result {
            Ok(entity) => {
                info!("Saved {resource} {} ({:?})", entity.id, entity.name);
                report.created.push(entity);
            }
            Err(failure) => {
                warn!(
                    "Saving {resource} {} of {} ({:?}) failed: {failure}",
                    index + 1,
                    payloads.len(),
                    payload.name
                );
                report.failure = Some(SubmitFailure {
                    index,
                    error: failure.into(),
                });
                report.skipped = payloads.len() - index - 1;
                break;
            }
        }
    }

    report
}
