//! Identity tags for asynchronous work started by a session.
//!
//! Every name check and submission is issued with a ticket carrying the
//! session identity and a sequence number. A session only accepts a result
//! whose ticket is still the newest one it issued, so late responses and
//! responses for closed sessions are dropped.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    models::Resource, params::EntityPayload, submit::SubmitTarget, validate::CheckRequest,
};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn next() -> Self {
        SessionId(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Tag of an in-flight name check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTicket {
    pub session: SessionId,
    pub seq: u64,
}

/// Tag of an in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTicket {
    pub session: SessionId,
    pub seq: u64,
}

/// A name check the caller must run and hand back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    pub ticket: CheckTicket,
    pub request: CheckRequest,
}

/// A submission the caller must run and hand back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmit {
    pub ticket: SubmitTicket,
    pub resource: Resource,
    pub target: SubmitTarget,
    /// Staged drafts first, then the current draft
    pub payloads: Vec<EntityPayload>,
}
