//! Error types for the analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the analyzer's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Analyzer error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Analyzer not initialized (set an engine or custom codebase path first)")]
    NotInitialized,

    #[error("Unknown subsystem: {name}")]
    UnknownSubsystem { name: String },

    #[error("Subsystem directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Class not found: {name}")]
    ClassNotFound { name: String },

    /// A file inside a concurrent batch failed to read or parse. The whole
    /// batch is abandoned when this is raised.
    #[error("Failed to process {path}: {message}")]
    BatchIo { path: PathBuf, message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Query error: {message}")]
    QueryError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Unknown pattern: {name}")]
    UnknownPattern { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Wrap a per-file failure raised inside a batch
    pub fn batch_io(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Error::BatchIo {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
