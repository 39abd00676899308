//! Core error types and traits for the ZeroPass client

use thiserror::Error;

/// Result type alias for ZeroPass operations
pub type ZeroPassResult<T> = Result<T, ZeroPassError>;

/// Unified error trait implemented by [`ZeroPassError`].
///
/// - error_code(): Unique code for programmatic error identification
/// - message(): Human-readable error message
/// - context(): Optional additional context
/// - hint(): Optional recovery suggestion shown to the user
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Get an actionable suggestion for the user
    fn hint(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, keeping its variant
    fn context<C: std::fmt::Display>(self, context: C) -> ZeroPassResult<T>;

    /// Attach context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> ZeroPassResult<T>;
}

impl<T> ResultExt<T> for ZeroPassResult<T> {
    fn context<C: std::fmt::Display>(self, context: C) -> ZeroPassResult<T> {
        self.map_err(|e| e.with_context(context.to_string()))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> ZeroPassResult<T> {
        self.map_err(|e| e.with_context(f().to_string()))
    }
}

/// Main error type for the ZeroPass client
#[derive(Error, Debug, Clone)]
pub enum ZeroPassError {
    /// No response from the backend (connectivity, cold start, timeout)
    #[error("Network error: {message}")]
    Network {
        message: String,
        url: Option<String>,
        context: Option<String>,
    },

    /// The backend answered with a non-success status
    #[error("HTTP {status_code}: {message}")]
    Http {
        message: String,
        status_code: u16,
        url: Option<String>,
        context: Option<String>,
    },

    /// The backend no longer recognizes an id the client believed valid
    #[error("Stale reference: {message}")]
    StaleReference {
        message: String,
        resource_id: String,
        context: Option<String>,
    },

    /// A write targets a record tagged to a different identity
    #[error("Ownership error: {message}")]
    Ownership {
        message: String,
        owner: Option<String>,
        context: Option<String>,
    },

    /// Unparsable user-supplied payload
    #[error("Malformed input: {message}")]
    MalformedInput {
        message: String,
        context: Option<String>,
    },

    /// Input rejected by local validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// Persisted storage inaccessible or full
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },
}
