//! Error types for item source fetching

use thiserror::Error;

/// Errors that can occur while fetching an item source
#[derive(Error, Debug)]
pub enum FetchError {
    /// No source identifier was given
    #[error("Missing source: enter a feed URL to replay")]
    MissingSource,

    /// The summary endpoint answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Source not known to an in-memory source
    #[error("Unknown source: {0}")]
    NotFound(String),

    /// The fetch task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Create a status error from a response body, falling back to the reason phrase
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = if body.trim().is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(|reason| format!("{status} {reason}"))
                .unwrap_or_else(|| format!("Request failed with status {status}"))
        } else {
            body
        };
        Self::Status { status, message }
    }

    /// Check if retrying the same request might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
