//! Core domain types, errors, and constants for `blazebridge`.
//!
//! This crate establishes the building blocks shared by the BEP ingestion
//! and project sync crates.
//!
//! ## Key Components
//!
//! - **`errors`**: The workspace-wide `Error` enum, its `Result` alias and the
//!   `ResultExt` context helpers.
//! - **`types`**: Validated newtypes such as `Label`, plus the import settings
//!   that identify a project on disk.
//! - **`constants`**: Environment variable names and well-known file names.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
