//! Backend resource collections.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A REST collection exposed by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Objective,
    Deliverable,
    Activity,
    WeeklySheet,
}

impl Resource {
    /// Path segment of the collection, relative to the API base URL.
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Objective => "objectives",
            Resource::Deliverable => "deliverables",
            Resource::Activity => "activities",
            Resource::WeeklySheet => "weekly-sheets",
        }
    }

    /// Singular noun used in user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Resource::Objective => "objective",
            Resource::Deliverable => "deliverable",
            Resource::Activity => "activity",
            Resource::WeeklySheet => "weekly sheet",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.noun())
    }
}
