//! Client-side validation for wizard drafts.
//!
//! - [`field`]: pure length/presence checks on trimmed text
//! - [`duplicate`]: name-collision detection against staged siblings and the
//!   scoped collection on the backend

pub mod duplicate;
pub mod field;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use duplicate::{
    duplicate_indices, find_duplicate, normalize, CheckOutcome, CheckRequest, DuplicateChecker,
    DuplicateSource,
};
pub use field::{validate, validate_length, FieldIssue, LengthPolicy, ValidationResult};

/// Identifies one input of a draft.
///
/// Serializes as the backend's field name (`name`, `criteria.1`, ...), so it
/// can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FieldKey {
    Name,
    Description,
    /// The criterion list as a whole (e.g. "at least one criterion")
    Criteria,
    /// A single criterion, 0-indexed
    Criterion(usize),
}

impl FieldKey {
    /// Maps a field name used in backend error bodies onto a draft field.
    ///
    /// Accepts `name`, `description`, `criteria`, and per-item forms such as
    /// `criteria.1`, `criteria[1]` or `criteria.1.description`.
    ///
    /// ```rust
    /// use cocoa_core::validate::FieldKey;
    ///
    /// assert_eq!(FieldKey::from_backend("name"), Some(FieldKey::Name));
    /// assert_eq!(FieldKey::from_backend("criteria[2]"), Some(FieldKey::Criterion(2)));
    /// assert_eq!(FieldKey::from_backend("criteria.0.description"), Some(FieldKey::Criterion(0)));
    /// assert_eq!(FieldKey::from_backend("owner"), None);
    /// ```
    pub fn from_backend(field: &str) -> Option<FieldKey> {
        let field = field.trim();
        match field {
            "name" => return Some(FieldKey::Name),
            "description" => return Some(FieldKey::Description),
            "criteria" => return Some(FieldKey::Criteria),
            _ => {}
        }

        let rest = field.strip_prefix("criteria")?;
        let digits: String = rest
            .trim_start_matches(['.', '['])
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok().map(FieldKey::Criterion)
    }

    /// Field name as used in backend error bodies.
    pub fn wire_name(&self) -> String {
        match self {
            FieldKey::Name => "name".to_string(),
            FieldKey::Description => "description".to_string(),
            FieldKey::Criteria => "criteria".to_string(),
            FieldKey::Criterion(index) => format!("criteria.{index}"),
        }
    }

    /// Whether the field is edited on the criteria step.
    pub fn is_criteria(&self) -> bool {
        matches!(self, FieldKey::Criteria | FieldKey::Criterion(_))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name => write!(f, "name"),
            FieldKey::Description => write!(f, "description"),
            FieldKey::Criteria => write!(f, "criteria"),
            FieldKey::Criterion(index) => write!(f, "criterion {}", index + 1),
        }
    }
}

impl From<FieldKey> for String {
    fn from(field: FieldKey) -> Self {
        field.wire_name()
    }
}

impl TryFrom<String> for FieldKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::from_backend(s).ok_or_else(|| format!("Unknown field: {s}"))
    }
}
