//! Configuration management for blazebridge
//!
//! Settings for BEP ingestion and the project data cache, loaded once at
//! startup from defaults, an optional JSON file and environment overrides.

pub mod config;
pub mod loader;

pub use config::*;
pub use loader::*;
