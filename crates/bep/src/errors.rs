//! Error types for BEP ingestion
//!
//! Three families are distinguished: stream corruption (the bytes cannot be
//! turned into events), structural inconsistency (the events contradict each
//! other) and plain I/O failures opening the source.

use std::path::PathBuf;

/// Result type for BEP operations
pub type Result<T> = std::result::Result<T, BepError>;

#[derive(Debug, thiserror::Error)]
pub enum BepError {
    /// I/O error opening or reading the event source
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Length prefix or message body could not be read
    #[error("corrupted build event stream at byte {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// Declared message size exceeds the configured limit
    #[error("build event at byte {offset} declares {size} bytes, limit is {limit}")]
    MessageTooLarge { offset: u64, size: u64, limit: usize },

    /// Message body is not a valid build event
    #[error("undecodable build event at byte {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: prost::DecodeError,
    },

    /// Error signalled by a live stream provider
    #[error("build event stream failed: {message}")]
    Stream { message: String },

    /// A named set references an id that was never recorded
    #[error("named set '{set_id}' is not defined{}", .referenced_from.as_ref().map(|r| format!(" (referenced from '{r}')")).unwrap_or_default())]
    DanglingReference {
        set_id: String,
        referenced_from: Option<String>,
    },

    /// Named set lists itself as a direct child
    #[error("named set '{set_id}' references itself")]
    SelfReferentialSet { set_id: String },

    /// Named set transitively depends on itself
    #[error("named set cycle: {}", .path.join(" -> "))]
    CyclicNamedSet { path: Vec<String> },

    /// Target completed under a configuration that was never declared
    #[error("target '{label}' completed under undeclared configuration '{configuration_id}'")]
    UnknownConfiguration {
        label: String,
        configuration_id: String,
    },

    /// Event whose identifier and payload do not fit together
    #[error("malformed {kind} event: {reason}")]
    MalformedEvent { kind: String, reason: String },
}

impl BepError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        BepError::Io {
            path: path.into(),
            operation,
            source,
        }
    }

    #[must_use]
    pub fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        BepError::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        BepError::Stream {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(kind: impl ToString, reason: impl Into<String>) -> Self {
        BepError::MalformedEvent {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }

    /// The bytes of the stream could not be turned into events
    #[must_use]
    pub const fn is_stream_corruption(&self) -> bool {
        matches!(
            self,
            BepError::Corruption { .. }
                | BepError::MessageTooLarge { .. }
                | BepError::Decode { .. }
                | BepError::Stream { .. }
        )
    }

    /// The events are individually valid but inconsistent with each other
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            BepError::DanglingReference { .. }
                | BepError::SelfReferentialSet { .. }
                | BepError::CyclicNamedSet { .. }
                | BepError::UnknownConfiguration { .. }
                | BepError::MalformedEvent { .. }
        )
    }
}
