//! Unified error handling for the rerelease crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`RereleaseErrorTrait`] - Common interface for error handling strategies
//! - [`ErrorCategory`] - Classification of errors
//! - [`Error`] - Unified error enum wrapping the domain-specific errors
//!
//! Rule text never produces an error: unrecognized text decodes to the
//! default rule. Items excluded by bounds are reported as skipped slots.
//!
//! # Usage
//!
//! ```rust
//! use rerelease::error::{Error, ErrorCategory, RereleaseErrorTrait};
//! use rerelease::source::FetchError;
//!
//! let err: Error = FetchError::status(503, "try later").into();
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), ErrorCategory::Network);
//! ```

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::address::AddressError;
pub use crate::source::FetchError;

/// Common trait for rerelease error types
pub trait RereleaseErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Item source errors (HTTP, status, missing source)
    Network,
    /// Decoding of summaries, queries and JSON
    Parsing,
    /// Configuration and validation errors
    Config,
    /// Pipeline task errors
    Pipeline,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Config => "config",
            Self::Pipeline => "pipeline",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the rerelease crate
#[derive(Error, Debug)]
pub enum Error {
    /// Item source errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Shareable address errors
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Pipeline task errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RereleaseErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Address(_) => false,
            Self::Pipeline(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(FetchError::Decode(_)) => ErrorCategory::Parsing,
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Address(_) => ErrorCategory::Parsing,
            Self::Pipeline(_) => ErrorCategory::Pipeline,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::MissingSource);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let decode_err = Error::Fetch(FetchError::Decode("expected value".into()));
        assert_eq!(decode_err.category(), ErrorCategory::Parsing);

        let address_err = Error::Address(AddressError::InvalidInstant {
            field: "first",
            value: "yesterday".into(),
        });
        assert_eq!(address_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_is_recoverable() {
        let unavailable: Error = FetchError::status(503, "").into();
        assert!(unavailable.is_recoverable());

        let not_found: Error = FetchError::status(404, "no such feed").into();
        assert!(!not_found.is_recoverable());

        let missing: Error = FetchError::MissingSource.into();
        assert!(!missing.is_recoverable());
    }

    #[test]
    fn test_display_keeps_server_text() {
        let err: Error = FetchError::status(400, "Feed could not be parsed").into();
        assert_eq!(err.to_string(), "Fetch error: Feed could not be parsed");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("debounce must be positive");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_with_source_keeps_chain() {
        let io = std::io::Error::other("task aborted");
        let err = Error::with_source("pipeline task failed", io);
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.to_string(), "pipeline task failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("task aborted"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert!(matches!(err, Error::Other { ref context, .. } if context == "boom"));
    }
}
