//! Error types for pagewalk
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors are `Clone` so that a pager holding a sticky error can hand the
//! same error back on every call. Foreign error types that are not `Clone`
//! are stored behind an `Arc`.

use std::sync::Arc;
use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(Arc<reqwest::Error>),

    #[error("HTTP {status} for {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Deadline exceeded after {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(Arc<serde_json::Error>),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to build page from {url}: {source}")]
    PageConstruction {
        url: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Failed to determine next page of {url}: {message}")]
    NextPageUrl { url: String, message: String },

    #[error("Unexpected body shape: expected {expected}, got {actual}")]
    UnexpectedBodyShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("The requested page does not exist")]
    PageNotAvailable,

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(Arc::new(err))
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wrap a construction failure with the URL of the page that failed
    pub fn page_construction(url: impl Into<String>, source: Error) -> Self {
        Self::PageConstruction {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create a next page URL error
    pub fn next_page_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NextPageUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected body shape error
    pub fn unexpected_shape(expected: &'static str, actual: &'static str) -> Self {
        Self::UnexpectedBodyShape { expected, actual }
    }

    /// Check if this error was caused by cancellation or an expired deadline
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded { .. })
    }

    /// Get the HTTP status code, if this is a status error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::PageConstruction { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
