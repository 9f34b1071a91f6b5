//! Name-collision detection.
//!
//! Names are compared after [`normalize`]: trimmed, inner whitespace collapsed
//! to single spaces, lowercased. `"Foo "` and `"foo"` collide.
//!
//! A collision can come from three places. Criteria are checked against the
//! other criteria of the same draft. Names are checked against drafts staged
//! earlier in the same session, which needs no network, and then against the
//! scoped collection on the backend, which does.

use std::{collections::HashSet, fmt};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    backend::Backend,
    models::{Entity, Resource, ScopeKey},
};

/// Canonical form used for every uniqueness comparison.
///
/// ```rust
/// use cocoa_core::validate::normalize;
///
/// assert_eq!(normalize("  Reporte   SEMANAL "), "reporte semanal");
/// ```
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Where a conflicting name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSource {
    /// Another entry in the same list within the draft
    Sibling,
    /// A draft staged earlier in the same wizard session
    Staged,
    /// An existing record in the scoped backend collection
    Remote,
}

impl fmt::Display for DuplicateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateSource::Sibling => write!(f, "is repeated in this list"),
            DuplicateSource::Staged => write!(f, "is already staged in this session"),
            DuplicateSource::Remote => write!(f, "already exists in this scope"),
        }
    }
}

/// Checks `candidate` against staged sibling names and a remote list.
///
/// Staged drafts are checked first so the message names the closer conflict.
/// `exclude_id` skips the record being edited. Empty candidates never
/// collide; they are a presence error, not a duplicate.
pub fn find_duplicate<'a, I>(
    candidate: &str,
    staged: I,
    remote: &[Entity],
    exclude_id: Option<u64>,
) -> Option<DuplicateSource>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = normalize(candidate);
    if needle.is_empty() {
        return None;
    }

    if staged.into_iter().any(|name| normalize(name) == needle) {
        return Some(DuplicateSource::Staged);
    }

    remote
        .iter()
        .filter(|entity| Some(entity.id) != exclude_id)
        .any(|entity| normalize(&entity.name) == needle)
        .then_some(DuplicateSource::Remote)
}

/// Indices of entries that repeat an earlier entry.
///
/// The first occurrence is kept valid and every later repeat is reported.
/// Blank entries are skipped.
///
/// ```rust
/// use cocoa_core::validate::duplicate_indices;
///
/// let items = ["Debe cumplir el plazo", "Otro criterio", "debe cumplir el plazo "];
/// assert_eq!(duplicate_indices(&items), vec![2]);
/// ```
pub fn duplicate_indices<S: AsRef<str>>(items: &[S]) -> Vec<usize> {
    let mut seen = HashSet::new();
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let key = normalize(item.as_ref());
            if key.is_empty() || seen.insert(key) {
                None
            } else {
                Some(index)
            }
        })
        .collect()
}

/// Everything a remote name check needs, owned so it can move into a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub resource: Resource,
    pub scope: ScopeKey,
    pub candidate: String,
    /// Names of drafts staged earlier in the session
    pub staged: Vec<String>,
    /// Record being edited, excluded from the comparison
    pub exclude_id: Option<u64>,
}

/// Result of a remote name check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum CheckOutcome {
    Unique,
    Duplicate(DuplicateSource),
    /// The scoped collection could not be read. Never treated as unique.
    Failed(String),
}

/// Runs name checks against a backend.
pub struct DuplicateChecker<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: Backend + ?Sized> DuplicateChecker<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Reads the scoped collection once and looks for a collision.
    pub async fn check(&self, request: &CheckRequest) -> CheckOutcome {
        let staged = request.staged.iter().map(String::as_str);
        if let Some(source) = find_duplicate(&request.candidate, staged, &[], None) {
            return CheckOutcome::Duplicate(source);
        }

        match self
            .backend
            .list_scoped(request.resource, &request.scope)
            .await
        {
            Ok(existing) => {
                debug!(
                    "Checked {:?} against {} {} record(s) in {}",
                    request.candidate,
                    existing.len(),
                    request.resource,
                    request.scope
                );
                match find_duplicate(
                    &request.candidate,
                    std::iter::empty(),
                    &existing,
                    request.exclude_id,
                ) {
                    Some(source) => CheckOutcome::Duplicate(source),
                    None => CheckOutcome::Unique,
                }
            }
            Err(failure) => {
                warn!(
                    "Name check for {} in {} failed: {failure}",
                    request.resource, request.scope
                );
                CheckOutcome::Failed(failure.user_message())
            }
        }
    }
}
