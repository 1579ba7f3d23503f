//! Store error types.

use serde::Deserialize;
use thiserror::Error;

/// A remote document could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("document path has no id segment: '{0}'")]
    MissingId(String),

    #[error("document is missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has the wrong kind, expected {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors that can occur while talking to the remote document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network failure or an unreadable response body
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("remote store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A document was readable but not a valid record
    #[error("unexpected document shape: {0}")]
    Mapping(#[from] MappingError),
}

/// Firestore error envelope: `{ "error": { "code", "message", "status" } }`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl StoreError {
    /// Builds a `Status` error from a failed response body, preferring the
    /// message inside a Firestore error envelope.
    pub(crate) fn from_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) if !envelope.error.message.is_empty() => {
                    format!("{} ({})", envelope.error.message, code)
                }
                Some(code) => code,
                None => envelope.error.message,
            },
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => reason.unwrap_or("no response body").to_string(),
        };
        StoreError::Status { status, message }
    }
}
