//! Error types.
//!
//! None of these ever reach the caller of a logging entry point: failures
//! inside a dispatch are rendered to the logger's error stream and dropped.
//! They surface directly only from configuration loading, the record reader
//! and `IndexClient` implementations.

use thiserror::Error;

/// Failures that can occur while dispatching or reading records.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// The record could not be serialized to JSON
    #[error("Error marshalling log record to json: {0}")]
    Encode(#[source] serde_json::Error),

    /// A console line could not be parsed back into a record
    #[error("Malformed log record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The remote sink rejected or failed to deliver the record
    #[error("Error indexing log: {0}")]
    Index(#[from] IndexError),

    /// Writing to or reading from a local stream failed
    #[error("Log stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by an [`IndexClient`](crate::IndexClient).
#[derive(Error, Debug)]
pub enum IndexError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend answered with a non-success status
    #[error("index `{index}` rejected document with status {status}: {body}")]
    Rejected {
        index: String,
        status: u16,
        body: String,
    },

    /// The client panicked while indexing
    #[error("index client panicked: {0}")]
    Panicked(String),

    /// Any other client-specific failure
    #[error("{0}")]
    Other(String),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable held an unusable value
    #[error("Invalid value for {var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: ParseSeverityError,
    },

    #[error("Invalid time format `{0}`")]
    InvalidTimeFormat(String),

    #[error("Index name must not be empty")]
    EmptyIndex,
}

/// Returned when a string names no known severity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity `{0}` (expected DEBUG, INFO, WARNING, ERROR or FATAL)")]
pub struct ParseSeverityError(pub String);
