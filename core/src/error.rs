//! Error type surfaced by every failing product operation.
//!
//! # Design
//! Two shapes only: the request never produced a usable response (`Network`),
//! or the backend answered with a non-2xx status (`Server`). The `Display`
//! output is the human-readable message the UI renders as-is.

use thiserror::Error;

/// Failure of a product fetch or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No usable response: connectivity failure, or a payload that could not
    /// be encoded or decoded on the client side.
    #[error("An error occurred: {0}")]
    Network(String),

    /// The backend returned an unsuccessful status code.
    #[error("Backend returned code {status}, body was: {body}")]
    Server { status: u16, body: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network(message.into())
    }

    /// Status code of a server-side failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Network(_) => None,
            FetchError::Server { status, .. } => Some(*status),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
