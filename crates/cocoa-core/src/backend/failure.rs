//! Classification of unsuccessful backend responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TRANSPORT_MESSAGE;

/// Message used when a 4xx body carries no message of its own.
pub const GENERIC_REJECTION: &str = "The server rejected the request";

/// Message used for a 409 without a body message.
const GENERIC_CONFLICT: &str = "A record with this name already exists";

/// Why a backend call did not produce a record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendFailure {
    /// 4xx with a readable body.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },
    /// 409: the name is already taken.
    #[error("conflict: {message}")]
    Conflict { message: String },
    /// Network error, timeout, 5xx or an unreadable response. `message` is
    /// the raw cause, for logs only.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl BackendFailure {
    /// Text that is safe to show to a user.
    pub fn user_message(&self) -> String {
        match self {
            BackendFailure::Rejected { message, .. } | BackendFailure::Conflict { message } => {
                message.clone()
            }
            BackendFailure::Transport { .. } => TRANSPORT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, FieldMessages>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl From<FieldMessages> for Vec<String> {
    fn from(messages: FieldMessages) -> Self {
        match messages {
            FieldMessages::One(message) => vec![message],
            FieldMessages::Many(messages) => messages,
        }
    }
}

/// Turns a non-2xx status and its body into a [`BackendFailure`].
///
/// ```rust
/// use cocoa_core::backend::{classify_failure, BackendFailure};
///
/// let failure = classify_failure(400, r#"{"message": "nombre duplicado"}"#);
/// assert_eq!(failure.user_message(), "nombre duplicado");
///
/// let failure = classify_failure(502, "<html>Bad Gateway</html>");
/// assert!(matches!(failure, BackendFailure::Transport { .. }));
/// ```
pub fn classify_failure(status: u16, body: &str) -> BackendFailure {
    if !(400..500).contains(&status) {
        return BackendFailure::Transport {
            message: format!("unexpected status {status}: {}", excerpt(body)),
        };
    }

    let parsed = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return BackendFailure::Transport {
                message: format!("unreadable {status} response ({e}): {}", excerpt(body)),
            };
        }
    };

    let message = parsed
        .message
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());

    if status == 409 {
        return BackendFailure::Conflict {
            message: message.unwrap_or_else(|| GENERIC_CONFLICT.to_string()),
        };
    }

    BackendFailure::Rejected {
        status,
        message: message.unwrap_or_else(|| GENERIC_REJECTION.to_string()),
        fields: parsed
            .errors
            .into_iter()
            .map(|(field, messages)| (field, messages.into()))
            .collect(),
    }
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}…", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
