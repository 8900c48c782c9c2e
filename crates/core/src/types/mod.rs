//! Core domain types for blazebridge.
//!
//! - **`newtypes`**: validated wrappers for build labels
//! - **`settings`**: project import settings and the on-disk layout derived from them

pub mod newtypes;
pub mod settings;

pub use newtypes::*;
pub use settings::*;
