//! Error types for the project data cache
//!
//! Every variant carries a [`RecoveryHint`] so the host can tell the user what
//! to do when persisted project data cannot be used.

use std::path::PathBuf;

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// I/O error reading or writing the cache file
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Snapshot bytes could not be encoded or decoded
    #[error("failed to {operation} project data: {source}")]
    Codec {
        operation: CodecOp,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// File does not start with the snapshot header
    #[error("not a project data snapshot: {reason}")]
    InvalidHeader {
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Snapshot was written by an incompatible schema version
    #[error("project data version mismatch: expected v{expected}, found v{actual}")]
    VersionMismatch {
        expected: u32,
        actual: u32,
        recovery_hint: RecoveryHint,
    },

    /// The bounded task queue has no free slot
    #[error("task queue is full ({capacity} pending), dropping '{label}'")]
    QueueFull {
        label: String,
        capacity: usize,
        recovery_hint: RecoveryHint,
    },

    /// The task runner was shut down
    #[error("task runner is shut down, cannot run '{label}'")]
    Disposed {
        label: String,
        recovery_hint: RecoveryHint,
    },

    /// The writer thread could not be started
    #[error("failed to start worker thread '{name}': {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOp {
    Encode,
    Decode,
}

impl std::fmt::Display for CodecOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecOp::Encode => f.write_str("encode"),
            CodecOp::Decode => f.write_str("decode"),
        }
    }
}

/// What the host can do about a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Rebuild the project data with a fresh sync
    Resync,
    /// Check file permissions
    CheckPermissions { path: PathBuf },
    /// Nothing to do; the operation can be retried later
    Retry,
    /// Operation can be safely ignored
    Ignore,
}

impl SyncError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, operation: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        let recovery_hint = match source.kind() {
            std::io::ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions { path: path.clone() },
            _ => RecoveryHint::Resync,
        };
        SyncError::Io {
            path,
            operation: operation.into(),
            source,
            recovery_hint,
        }
    }

    #[must_use]
    pub fn codec(
        operation: CodecOp,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SyncError::Codec {
            operation,
            source: source.into(),
            recovery_hint: RecoveryHint::Resync,
        }
    }

    #[must_use]
    pub fn invalid_header(reason: impl Into<String>) -> Self {
        SyncError::InvalidHeader {
            reason: reason.into(),
            recovery_hint: RecoveryHint::Resync,
        }
    }

    pub fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            SyncError::Io { recovery_hint, .. }
            | SyncError::Codec { recovery_hint, .. }
            | SyncError::InvalidHeader { recovery_hint, .. }
            | SyncError::VersionMismatch { recovery_hint, .. }
            | SyncError::QueueFull { recovery_hint, .. }
            | SyncError::Disposed { recovery_hint, .. }
            | SyncError::WorkerSpawn { recovery_hint, .. } => recovery_hint,
        }
    }

    /// The cache file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Failure came from reading or writing bytes rather than from the data itself
    pub fn is_io(&self) -> bool {
        match self {
            SyncError::Io { .. } => true,
            SyncError::Codec { source, .. } => source.is::<std::io::Error>(),
            _ => false,
        }
    }
}

impl From<blazebridge_core::Error> for SyncError {
    fn from(error: blazebridge_core::Error) -> Self {
        match error {
            blazebridge_core::Error::FileSystem {
                path,
                operation,
                source,
            } => SyncError::io(path, operation, source),
            other => SyncError::codec(CodecOp::Encode, other),
        }
    }
}

/// Log message for a failed background save
pub fn serialization_error_message(error: &SyncError) -> String {
    let message = "Could not save cache data file to disk.";
    if error.is_io() {
        format!("{message} Please resync project.")
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_failures_ask_for_resync() {
        let err = SyncError::io("/p/cache.dat.gz", "write", io::Error::other("disk gone"));
        assert_eq!(
            serialization_error_message(&err),
            "Could not save cache data file to disk. Please resync project."
        );
    }

    #[test]
    fn data_failures_do_not_ask_for_resync() {
        let err = SyncError::VersionMismatch {
            expected: 2,
            actual: 1,
            recovery_hint: RecoveryHint::Resync,
        };
        assert_eq!(
            serialization_error_message(&err),
            "Could not save cache data file to disk."
        );
    }

    #[test]
    fn permission_denied_suggests_checking_permissions() {
        let err = SyncError::io(
            "/p",
            "open",
            io::Error::new(io::ErrorKind::PermissionDenied, "no"),
        );
        assert_eq!(
            err.recovery_hint(),
            &RecoveryHint::CheckPermissions {
                path: PathBuf::from("/p")
            }
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn core_file_system_error_converts_to_io() {
        let core = blazebridge_core::Error::file_system(
            "/p/x",
            "atomic rename",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        let err = SyncError::from(core);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("atomic rename"));
    }
}
