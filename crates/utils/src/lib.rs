//! Shared utilities for blazebridge
//!
//! Small, dependency-light helpers used by the BEP and sync crates: tracing
//! setup, RAII cleanup of temporary files, atomic file writes and XDG paths.

pub mod atomic_file;
pub mod cleanup;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use cleanup::*;
pub use xdg::*;
