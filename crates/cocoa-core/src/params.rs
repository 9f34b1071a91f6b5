//! Request bodies sent to the backend.
//!
//! These are the only shapes the wizard writes. They are produced from a
//! validated [`crate::wizard::Draft`] and never built from unvalidated input
//! inside this crate.
//!
//! With the `schema` feature enabled the payloads also derive
//! `schemars::JsonSchema`, so interface layers can publish the contract:
//!
//! ```ignore
//! let schema = schemars::schema_for!(cocoa_core::params::EntityPayload);
//! println!("{}", serde_json::to_string_pretty(&schema)?);
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of `POST /<collection>` and `PUT /<collection>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct EntityPayload {
    /// Trimmed name, unique within the scope
    pub name: String,
    /// Optional trimmed description; omitted when blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Acceptance criteria, in display order
    pub criteria: Vec<CriterionPayload>,
    /// Scope the record belongs to, e.g. `objective:3`
    pub scope_key: String,
}

/// One criterion inside an [`EntityPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CriterionPayload {
    pub description: String,
}

/// Draft input read from a batch file by interface layers.
///
/// Unlike [`EntityPayload`] this is raw, unvalidated input: it is fed into a
/// wizard session field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DraftInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
}
