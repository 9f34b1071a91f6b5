//! Error types for the wizard library.
//!
//! [`CocoaError`] covers library failures (configuration, I/O, client setup,
//! rejected wizard transitions). [`FormError`] is the user-facing taxonomy a
//! form shows next to a field, above a step, or in a banner.

use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    backend::BackendFailure,
    validate::{DuplicateSource, FieldIssue, FieldKey},
};

/// Banner text shown for any transport-level failure.
pub const TRANSPORT_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// Comprehensive error type for all library operations.
#[derive(Error, Debug)]
pub enum CocoaError {
    /// HTTP client construction errors
    #[error("HTTP client error: {message}")]
    HttpClient {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A wizard transition was rejected
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CocoaError {
        CocoaError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CocoaError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Wraps an HTTP client construction error.
    pub fn http_client(message: impl Into<String>, source: reqwest::Error) -> Self {
        CocoaError::HttpClient {
            message: message.into(),
            source,
        }
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to CocoaError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| CocoaError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }
}

/// A wizard operation that the current session state does not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Step {step} cannot advance: {}", join(.errors))]
    StepInvalid { step: usize, errors: Vec<FormError> },
    #[error("The draft cannot be submitted: {}", join(.errors))]
    CannotSubmit { errors: Vec<FormError> },
    #[error("Submission is only possible from the last step (on step {step} of {last})")]
    NotLastStep { step: usize, last: usize },
    #[error("The wizard is {state} and no longer accepts changes")]
    Closed { state: &'static str },
    #[error("A submission is already in progress")]
    SubmitInFlight,
    #[error("Criterion {} does not exist", .index + 1)]
    NoSuchCriterion { index: usize },
    #[error("Staged draft {} does not exist", .index + 1)]
    NoSuchStaged { index: usize },
    #[error("This wizard does not support staging several drafts")]
    StagingUnsupported,
    #[error("Drafts can only be staged from the review step")]
    NotOnReviewStep,
    #[error("Already on the last step ({step})")]
    AtLastStep { step: usize },
    #[error("Cannot go back to step {step}")]
    InvalidStep { step: usize },
    #[error("The name has not been verified against existing records yet")]
    NameUnverified,
}

impl TransitionError {
    /// Form errors that caused the rejection, if any.
    pub fn form_errors(&self) -> &[FormError] {
        match self {
            TransitionError::StepInvalid { errors, .. }
            | TransitionError::CannotSubmit { errors } => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[FormError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Where a message belongs in the form, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "field", rename_all = "snake_case")]
pub enum MessageScope {
    Field(FieldKey),
    Step,
    Banner,
}

/// User-facing error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum FormError {
    /// A field breaks its length or presence rule. Never sent to the backend.
    #[error("{field} {issue}")]
    LocalValidation { field: FieldKey, issue: FieldIssue },

    /// A name collides with a sibling, a staged draft, or an existing record.
    #[error("{}", duplicate_message(.field, .origin, .detail.as_deref()))]
    Duplicate {
        field: FieldKey,
        origin: DuplicateSource,
        /// Message supplied by the backend when it reported the conflict
        detail: Option<String>,
    },

    /// Network failure, timeout, 5xx or an unreadable response.
    #[error("{message}")]
    Transport { message: String },

    /// Structured rejection from the backend.
    #[error("{message}")]
    BackendValidation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },
}

fn duplicate_message(field: &FieldKey, origin: &DuplicateSource, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => detail.to_string(),
        None => format!("{field} {origin}"),
    }
}

impl FormError {
    /// Field-level duplicate reported before any backend write.
    pub fn duplicate(field: FieldKey, origin: DuplicateSource) -> Self {
        FormError::Duplicate {
            field,
            origin,
            detail: None,
        }
    }

    /// The most specific place this message can be shown.
    pub fn scope(&self) -> MessageScope {
        match self {
            FormError::LocalValidation { field, .. } | FormError::Duplicate { field, .. } => {
                match field {
                    FieldKey::Criteria => MessageScope::Step,
                    other => MessageScope::Field(*other),
                }
            }
            FormError::Transport { .. } => MessageScope::Banner,
            FormError::BackendValidation { fields, .. } => fields
                .keys()
                .filter_map(|name| FieldKey::from_backend(name))
                .min()
                .map_or(MessageScope::Banner, |field| match field {
                    FieldKey::Criteria => MessageScope::Step,
                    other => MessageScope::Field(other),
                }),
        }
    }

    /// Per-field messages carried by the error, keyed by draft field. The
    /// messages omit the field label.
    ///
    /// Backend field names that do not map onto a draft field are dropped;
    /// the error's top-level message still reaches the banner.
    pub fn field_messages(&self) -> BTreeMap<FieldKey, Vec<String>> {
        let mut mapped = BTreeMap::new();
        match self {
            FormError::LocalValidation { field, issue } => {
                mapped.insert(*field, vec![issue.to_string()]);
            }
            FormError::Duplicate {
                field,
                origin,
                detail,
            } => {
                let message = detail.clone().unwrap_or_else(|| origin.to_string());
                mapped.insert(*field, vec![message]);
            }
            FormError::Transport { .. } => {}
            FormError::BackendValidation { fields, .. } => {
                for (name, messages) in fields {
                    if let Some(field) = FieldKey::from_backend(name) {
                        mapped
                            .entry(field)
                            .or_insert_with(Vec::new)
                            .extend(messages.iter().cloned());
                    }
                }
            }
        }
        mapped
    }

    /// The draft field a local or duplicate error is attached to.
    pub fn field(&self) -> Option<FieldKey> {
        match self {
            FormError::LocalValidation { field, .. } | FormError::Duplicate { field, .. } => {
                Some(*field)
            }
            FormError::Transport { .. } | FormError::BackendValidation { .. } => None,
        }
    }

    /// Short class label used in reports.
    pub fn class(&self) -> &'static str {
        match self {
            FormError::LocalValidation { .. } => "validation",
            FormError::Duplicate { .. } => "duplicate",
            FormError::Transport { .. } => "transport",
            FormError::BackendValidation { .. } => "rejected",
        }
    }
}

impl From<BackendFailure> for FormError {
    fn from(failure: BackendFailure) -> Self {
        match failure {
            BackendFailure::Conflict { message } => FormError::Duplicate {
                field: FieldKey::Name,
                origin: DuplicateSource::Remote,
                detail: Some(message),
            },
            BackendFailure::Rejected {
                message, fields, ..
            } => FormError::BackendValidation { message, fields },
            BackendFailure::Transport { .. } => FormError::Transport {
                message: TRANSPORT_MESSAGE.to_string(),
            },
        }
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, CocoaError>;
