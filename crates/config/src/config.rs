//! Centralized configuration for blazebridge
//!
//! The `Config` struct is immutable after construction and cheap to clone, so
//! it can be handed to the BEP finder and the project data cache alike.

use blazebridge_core::constants::{
    DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_TEST_OUTPUT_GROUP, DEFAULT_WRITE_QUEUE_CAPACITY,
    WRITE_THREAD_NAME,
};
use blazebridge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// BEP ingestion settings
    pub bep: BepConfig,
    /// Project data cache settings
    pub cache: CacheConfig,
    /// Default tracing filter when `BLAZEBRIDGE_LOG` is unset
    pub log_filter: Option<String>,
}

/// Settings for reading Build Event Protocol output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BepConfig {
    /// Largest single length-delimited message accepted by the reader
    pub max_message_bytes: usize,
    /// Output groups whose files are reported as test results
    pub test_output_groups: Vec<String>,
    /// Keep the events read before a stream error instead of failing the pass
    pub best_effort: bool,
}

impl Default for BepConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            test_output_groups: vec![DEFAULT_TEST_OUTPUT_GROUP.to_string()],
            best_effort: false,
        }
    }
}

/// Whether saved project data is written to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Persist on the background writer thread
    #[default]
    Background,
    /// Keep snapshots in memory only (headless runs and tests)
    Disabled,
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceMode::Background => write!(f, "background"),
            PersistenceMode::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for PersistenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" | "on" | "true" => Ok(PersistenceMode::Background),
            "disabled" | "off" | "false" => Ok(PersistenceMode::Disabled),
            other => Err(Error::validation(
                "persistence",
                format!("unknown persistence mode '{other}'"),
            )),
        }
    }
}

/// Settings for the project data cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Capacity of the bounded persistence queue
    pub queue_capacity: usize,
    /// Whether snapshots are written to disk
    pub persistence: PersistenceMode,
    /// Name of the dedicated writer thread
    pub writer_thread_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_WRITE_QUEUE_CAPACITY,
            persistence: PersistenceMode::Background,
            writer_thread_name: WRITE_THREAD_NAME.to_string(),
        }
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
}

impl Config {
    /// Reject values that would make the reader or writer unusable
    pub fn validate(&self) -> Result<()> {
        if self.bep.max_message_bytes == 0 {
            return Err(Error::validation(
                "bep.max_message_bytes",
                "must be greater than zero",
            ));
        }
        if self.bep.test_output_groups.iter().any(|g| g.is_empty()) {
            return Err(Error::validation(
                "bep.test_output_groups",
                "group names must not be empty",
            ));
        }
        if self.cache.queue_capacity == 0 {
            return Err(Error::validation(
                "cache.queue_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
