//! Error types for tagbox-inventory.
//!
//! Every component returns [`Result`]. Nothing inside a refresh recovers from
//! an error; the binary is the single place that turns an [`Error`] into a
//! process exit code via [`Error::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tagbox-inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for tagbox-inventory.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// The registry could not be reached.
    #[error("Failed to connect to registry at '{url}': {message}")]
    Transport {
        /// Requested URL (token stripped)
        url: String,
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The registry answered with an unexpected HTTP status.
    #[error("Registry response error from '{url}': HTTP {status} {reason}")]
    Response {
        /// Requested URL (token stripped)
        url: String,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// The registry answered well-formed JSON that signals a failure.
    #[error("Registry query failed: note:[{note}] url:[{url}]")]
    Query {
        /// Server-provided note
        note: String,
        /// Requested URL (token stripped)
        url: String,
    },

    /// The registry payload or a tag string did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// A persisted cache document failed to deserialize.
    #[error("Corrupt cache file '{path}': {source}")]
    CorruptCache {
        /// Path to the cache document
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// IO error.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new transport error from a request failure.
    pub fn transport(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates a new query error.
    pub fn query(note: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Query {
            note: note.into(),
            url: url.into(),
        }
    }

    /// Creates a new decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new IO error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error came from talking to the registry.
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Response { .. } | Error::Query { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => 2,
            Error::Transport { .. } | Error::Response { .. } => 3,
            Error::Query { .. } => 4,
            Error::Decode(_) => 5,
            Error::CorruptCache { .. } => 6,
            _ => 1,
        }
    }
}
