//! Error types for the Yari library.
//!
//! All fallible operations return [`Result`], and every error is a variant
//! of [`YariError`]. The variants follow the engine's error taxonomy:
//! configuration mistakes fail immediately, empty match sets are ordinary
//! values (never errors), I/O failures surface as fatal to the calling
//! operation, and query syntax errors report the offending position.

use std::io;

use thiserror::Error;

/// The main error type for Yari operations.
#[derive(Error, Debug)]
pub enum YariError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (malformed synonym rules, non-facet fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (invalid queries, unsupported combinations)
    #[error("Query error: {0}")]
    Query(String),

    /// Query syntax errors, with the byte position of the offending input
    #[error("Parse error at position {position}: {message}")]
    Parse {
        /// Byte offset into the query string where parsing failed.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Lookup failures for things that must exist (documents, files)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation cancelled via a cancellation token
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization failures of index data
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with YariError.
pub type Result<T> = std::result::Result<T, YariError>;

impl YariError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        YariError::Config(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        YariError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        YariError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        YariError::Query(msg.into())
    }

    /// Create a new parse error at the given input position.
    pub fn parse<S: Into<String>>(position: usize, msg: S) -> Self {
        YariError::Parse {
            position,
            message: msg.into(),
        }
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        YariError::Storage(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        YariError::NotFound(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        YariError::Cancelled(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        YariError::Serialization(msg.into())
    }
}
