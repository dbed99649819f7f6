//! Error types for the toplists scraper
//!
//! This module defines the domain error types used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a toplist page
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level HTTP error (connect, body read, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success response status
    #[error("Server responded with status {0}")]
    Status(u16),

    /// Every attempt failed with a retryable error
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether another attempt may succeed, given the retryable status set
    pub fn is_retryable(&self, retryable_statuses: &[u16]) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status(code) => retryable_statuses.contains(code),
            Self::RetriesExhausted { .. } | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while parsing pages and intermediate files
#[derive(Error, Debug)]
pub enum ParseError {
    /// A required column is absent from a CSV header
    #[error("Missing column '{column}' in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// A per-job file name does not follow `{type}_{discipline}_{age}.csv`
    #[error("Unrecognized file name: {0}")]
    FileName(String),

    /// The discipline mapping document is malformed
    #[error("Invalid discipline mapping: {0}")]
    Mapping(#[from] serde_json::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while persisting results
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that end a scrape job
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRYABLE: &[u16] = &[429, 500, 502, 503, 504];

    #[test]
    fn test_status_retryable() {
        assert!(FetchError::Status(503).is_retryable(RETRYABLE));
        assert!(FetchError::Status(429).is_retryable(RETRYABLE));
        assert!(!FetchError::Status(404).is_retryable(RETRYABLE));
        assert!(!FetchError::Status(403).is_retryable(RETRYABLE));
    }

    #[test]
    fn test_timeout_retryable() {
        assert!(FetchError::Timeout.is_retryable(RETRYABLE));
        assert!(FetchError::Timeout.is_retryable(&[]));
    }

    #[test]
    fn test_exhausted_is_terminal() {
        let err = FetchError::RetriesExhausted {
            attempts: 5,
            last: Box::new(FetchError::Status(502)),
        };
        assert!(!err.is_retryable(RETRYABLE));
        assert_eq!(
            err.to_string(),
            "Gave up after 5 attempts: Server responded with status 502"
        );
    }

    #[test]
    fn test_missing_column_message() {
        let err = ParseError::MissingColumn {
            column: "mark".to_string(),
            path: PathBuf::from("out/men/throws_shot-put_senior.csv"),
        };
        assert_eq!(
            err.to_string(),
            "Missing column 'mark' in out/men/throws_shot-put_senior.csv"
        );
    }
}
