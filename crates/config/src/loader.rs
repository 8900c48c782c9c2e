//! Configuration loader for blazebridge
//!
//! Precedence, lowest to highest: built-in defaults, the JSON config file,
//! environment variables. Every layer that contributed is recorded as a
//! [`ConfigSource`] so callers can explain where a value came from.

use crate::config::{Config, ConfigSource, PersistenceMode};
use blazebridge_core::constants::{
    BLAZEBRIDGE_BEST_EFFORT_VAR, BLAZEBRIDGE_CONFIG_VAR, BLAZEBRIDGE_MAX_MESSAGE_BYTES_VAR,
    BLAZEBRIDGE_PERSISTENCE_VAR, BLAZEBRIDGE_QUEUE_CAPACITY_VAR, CONFIG_FILENAME,
};
use blazebridge_core::{Error, Result, ResultExt};
use blazebridge_utils::XdgPaths;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Configuration together with the layers it was assembled from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub sources: Vec<ConfigSource>,
}

/// Configuration loader that handles all startup configuration
pub struct ConfigLoader {
    /// Explicit config file, overriding discovery
    file: Option<PathBuf>,
    /// Whether environment overrides are applied
    use_environment: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            file: None,
            use_environment: true,
        }
    }

    /// Load from this file instead of discovering one
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skip environment variable overrides
    pub fn without_environment(mut self) -> Self {
        self.use_environment = false;
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> Result<LoadedConfig> {
        let mut config = Config::default();
        let mut sources = vec![ConfigSource::Default];

        if let Some(path) = self.resolve_file() {
            config = read_config_file(&path)?;
            debug!(path = %path.display(), "loaded configuration file");
            sources.push(ConfigSource::ConfigFile(path));
        }

        if self.use_environment {
            apply_environment(&mut config, &mut sources, |name| std::env::var(name).ok())?;
        }

        config.validate()?;
        Ok(LoadedConfig { config, sources })
    }

    fn resolve_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.file {
            return Some(path.clone());
        }
        if self.use_environment {
            if let Ok(path) = std::env::var(BLAZEBRIDGE_CONFIG_VAR) {
                return Some(PathBuf::from(path));
            }
        }
        let discovered = XdgPaths::config_dir().join(CONFIG_FILENAME);
        discovered.is_file().then_some(discovered)
    }
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read configuration file", e))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid configuration file '{}'", path.display()))
}

fn apply_environment<F>(
    config: &mut Config,
    sources: &mut Vec<ConfigSource>,
    lookup: F,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(BLAZEBRIDGE_MAX_MESSAGE_BYTES_VAR) {
        config.bep.max_message_bytes = parse_var(BLAZEBRIDGE_MAX_MESSAGE_BYTES_VAR, &value)?;
        sources.push(ConfigSource::EnvironmentVariable(
            BLAZEBRIDGE_MAX_MESSAGE_BYTES_VAR.to_string(),
        ));
    }
    if let Some(value) = lookup(BLAZEBRIDGE_BEST_EFFORT_VAR) {
        config.bep.best_effort = parse_var(BLAZEBRIDGE_BEST_EFFORT_VAR, &value)?;
        sources.push(ConfigSource::EnvironmentVariable(
            BLAZEBRIDGE_BEST_EFFORT_VAR.to_string(),
        ));
    }
    if let Some(value) = lookup(BLAZEBRIDGE_QUEUE_CAPACITY_VAR) {
        config.cache.queue_capacity = parse_var(BLAZEBRIDGE_QUEUE_CAPACITY_VAR, &value)?;
        sources.push(ConfigSource::EnvironmentVariable(
            BLAZEBRIDGE_QUEUE_CAPACITY_VAR.to_string(),
        ));
    }
    if let Some(value) = lookup(BLAZEBRIDGE_PERSISTENCE_VAR) {
        config.cache.persistence = value.parse::<PersistenceMode>()?;
        sources.push(ConfigSource::EnvironmentVariable(
            BLAZEBRIDGE_PERSISTENCE_VAR.to_string(),
        ));
    }
    Ok(())
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::validation(name, format!("'{value}': {e}")))
}
