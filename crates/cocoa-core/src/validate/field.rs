//! Length and presence checks for single text fields.
//!
//! Every check trims its input first, so a value made only of whitespace is
//! treated as empty no matter how long the raw string is. Lengths are counted
//! in characters, not bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character-length bounds for one kind of field.
///
/// `min` and `max` bound the trimmed value. `cap` bounds the raw value that is
/// accepted into an edit buffer at all; it is larger than `max` so an
/// over-long value stays visible (and its error reachable) instead of being
/// silently cut down to a valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthPolicy {
    pub min: usize,
    pub max: usize,
    pub cap: usize,
}

impl LengthPolicy {
    /// Deliverable and objective names.
    pub const NAME: Self = Self::new(5, 50, 60);

    /// A single acceptance criterion.
    pub const CRITERION: Self = Self::new(10, 50, 60);

    /// Free-form description. Optional.
    pub const DESCRIPTION: Self = Self::new(0, 250, 300);

    /// Creates a policy from its bounds.
    pub const fn new(min: usize, max: usize, cap: usize) -> Self {
        Self { min, max, cap }
    }

    /// Truncates raw input to at most `cap` characters.
    ///
    /// ```rust
    /// use cocoa_core::validate::LengthPolicy;
    ///
    /// let policy = LengthPolicy::new(1, 3, 5);
    /// assert_eq!(policy.clamp("abcdefgh"), "abcde");
    /// assert_eq!(policy.clamp("ab"), "ab");
    /// ```
    pub fn clamp(&self, raw: &str) -> String {
        match raw.char_indices().nth(self.cap) {
            Some((byte_index, _)) => raw[..byte_index].to_string(),
            None => raw.to_string(),
        }
    }

    /// Validates a raw value against this policy.
    pub fn check(&self, raw: &str) -> ValidationResult {
        validate_length(raw, self.min, self.max)
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldIssue {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Required => write!(f, "is required"),
            FieldIssue::TooShort { min } => {
                write!(f, "is too short (minimum {min} characters)")
            }
            FieldIssue::TooLong { max } => {
                write!(f, "is too long (maximum {max} characters)")
            }
        }
    }
}

/// Outcome of validating one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "issue", rename_all = "snake_case")]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(FieldIssue),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn issue(&self) -> Option<FieldIssue> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(issue) => Some(*issue),
        }
    }

    /// Human-readable message, or `None` when the value is valid.
    pub fn message(&self) -> Option<String> {
        self.issue().map(|issue| issue.to_string())
    }
}

/// Validates `raw` against `[min, max]` characters after trimming.
///
/// A `min` of zero makes the field optional: an empty value is valid.
///
/// ```rust
/// use cocoa_core::validate::{validate_length, FieldIssue, ValidationResult};
///
/// assert_eq!(
///     validate_length("Te", 5, 50),
///     ValidationResult::Invalid(FieldIssue::TooShort { min: 5 })
/// );
/// assert_eq!(
///     validate_length("   ", 5, 50),
///     ValidationResult::Invalid(FieldIssue::Required)
/// );
/// assert!(validate_length("  Sprint  ", 5, 50).is_valid());
/// ```
pub fn validate_length(raw: &str, min: usize, max: usize) -> ValidationResult {
    let length = raw.trim().chars().count();

    if length == 0 {
        return if min == 0 {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(FieldIssue::Required)
        };
    }
    if length < min {
        return ValidationResult::Invalid(FieldIssue::TooShort { min });
    }
    if length > max {
        return ValidationResult::Invalid(FieldIssue::TooLong { max });
    }
    ValidationResult::Valid
}

/// Validates `raw` against a [`LengthPolicy`].
pub fn validate(raw: &str, policy: &LengthPolicy) -> ValidationResult {
    policy.check(raw)
}
