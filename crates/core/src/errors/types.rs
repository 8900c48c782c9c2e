//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for blazebridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for blazebridge operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A value failed validation
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// File system operations
    #[error("file system error during {operation} on '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the underlying I/O error kind for file system failures
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Error::FileSystem { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
