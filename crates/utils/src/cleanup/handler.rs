//! RAII guard for temporary files
//!
//! The guard owns the obligation to delete a file. Deletion happens either
//! explicitly through [`TempFileGuard::remove`] or implicitly on drop, so every
//! exit path of the owner (including early returns and panics) cleans up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// RAII guard for temporary files
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
    pending: bool,
}

impl TempFileGuard {
    /// Create a new temporary file guard
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            pending: true,
        }
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is still scheduled for deletion
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Keep the file after the guard is dropped
    pub fn keep(mut self) -> PathBuf {
        self.pending = false;
        self.path.clone()
    }

    /// Delete the file now.
    ///
    /// Returns `Ok(true)` if a file was removed, `Ok(false)` if there was nothing
    /// left to delete. Calling this again after a successful removal is a no-op.
    /// A failed removal stays pending so drop gets another chance.
    pub fn remove(&mut self) -> io::Result<bool> {
        if !self.pending {
            return Ok(false);
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {
                self.pending = false;
                debug!(path = %self.path.display(), "removed temporary file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.pending = false;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
