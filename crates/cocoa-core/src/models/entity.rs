//! Persisted records as returned by the backend.

use serde::{Deserialize, Serialize};

/// A record that already exists on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    /// Server-assigned identifier
    pub id: u64,

    /// Display name, unique within its scope
    pub name: String,

    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Acceptance criteria attached to the record
    #[serde(default)]
    pub criteria: Vec<CriterionRecord>,

    /// Scope the record belongs to, as echoed by the backend
    #[serde(
        default,
        rename = "scopeKey",
        alias = "scope_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope_key: Option<String>,
}

/// A persisted acceptance criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CriterionRecord {
    pub id: u64,
    pub description: String,
}
