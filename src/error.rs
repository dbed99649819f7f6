//! Unified error handling for the toplists crate
//!
//! Domain errors live in [`crate::utils::error`]; this module wraps them into a
//! single [`Error`] for use across module boundaries and classifies every error
//! into an [`ErrorCategory`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use toplists::error::{Error, ErrorClass};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(category = %err.category(), "{err}");
//!     } else {
//!         tracing::error!(category = %err.category(), "{err}");
//!     }
//! }
//! ```

use std::fmt;
use thiserror::Error;

pub use crate::utils::error::{FetchError, ParseError, ScrapeError, StorageError};

/// Common classification interface implemented by all toplists error types
pub trait ErrorClass: std::error::Error {
    /// Check if this error is transient (another attempt may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the toplists crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ErrorClass for FetchError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout | Self::Status(_))
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl ErrorClass for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl ErrorClass for StorageError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

impl ErrorClass for ScrapeError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Storage(e) => e.is_recoverable(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Storage(e) => e.category(),
        }
    }
}

impl ErrorClass for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => e.is_recoverable(),
            Self::Storage(e) => e.is_recoverable(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Parse(e) => e.category(),
            Self::Storage(e) => e.category(),
        }
    }
}

impl From<ScrapeError> for Error {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Fetch(e) => Self::Fetch(e),
            ScrapeError::Storage(e) => Self::Storage(e),
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
        let fetch_err = Error::Fetch(FetchError::Timeout);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let parse_err = Error::Parse(ParseError::FileName("x.csv".to_string()));
        assert_eq!(parse_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Fetch(FetchError::Timeout).is_recoverable());

        let exhausted = FetchError::RetriesExhausted {
            attempts: 5,
            last: Box::new(FetchError::Timeout),
        };
        assert!(!Error::Fetch(exhausted).is_recoverable());
    }

    #[test]
    fn test_scrape_error_conversion() {
        let err: Error = ScrapeError::Fetch(FetchError::Status(404)).into();
        assert!(matches!(err, Error::Fetch(FetchError::Status(404))));
    }

    #[test]
    fn test_invalid_url_is_config() {
        let err = Error::Fetch(FetchError::InvalidUrl("not a url".to_string()));
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.category().to_string(), "config");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_storage_io_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = Error::Storage(StorageError::io("out/men/a.csv", io));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.is_recoverable());
    }
}
