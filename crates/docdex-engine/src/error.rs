//! Engine error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Root path does not exist
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Root path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory listing failed at the root itself
    #[error("Failed to list {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for IndexError {
    fn from(e: serde_yaml::Error) -> Self {
        IndexError::Config(e.to_string())
    }
}
