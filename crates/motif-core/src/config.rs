//! Toolkit configuration
//!
//! Configuration is read from TOML, then overridden by `MOTIF_*` environment
//! variables, then validated. Only the registry mode and the log filter are
//! configurable; everything else is wired in code.

use crate::errors::{CompositionError, CompositionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Contract shared by configuration types
pub trait MotifConfig: Clone + Default + Send + Sync + 'static {
    /// Load configuration from a file
    fn load_from_file(path: &Path) -> CompositionResult<Self>;

    /// Apply overrides from the process environment
    fn merge_with_env(&mut self) -> CompositionResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from `(name, value)` pairs shaped like environment variables
    fn merge_with_vars<I>(&mut self, vars: I) -> CompositionResult<()>
    where
        I: IntoIterator<Item = (String, String)>;

    /// Merge with another configuration, preferring its non-default values
    fn merge_with(&mut self, other: &Self);

    /// Validate the configuration
    fn validate(&self) -> CompositionResult<()>;

    /// Set a value by dotted key (for CLI overrides)
    fn set_from_string(&mut self, key: &str, value: &str) -> CompositionResult<()>;
}

/// How a registry treats re-registration of an existing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryMode {
    /// Overwrite, last write wins (a warning is logged)
    #[default]
    Permissive,
    /// Reject with `DuplicateKey`
    Strict,
}

impl fmt::Display for RegistryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryMode::Permissive => f.write_str("permissive"),
            RegistryMode::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for RegistryMode {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(RegistryMode::Permissive),
            "strict" => Ok(RegistryMode::Strict),
            other => Err(CompositionError::config(format!(
                "unknown registry mode '{other}' (expected 'permissive' or 'strict')"
            ))),
        }
    }
}

/// Registry section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Re-registration policy
    pub mode: RegistryMode,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Registry settings
    pub registry: RegistryConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl ToolkitConfig {
    /// Prefix of environment overrides
    pub const ENV_PREFIX: &'static str = "MOTIF_";

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> CompositionResult<Self> {
        toml::from_str(content).map_err(|e| CompositionError::config(format!("invalid TOML: {e}")))
    }

    /// Render as TOML text
    pub fn to_toml_string(&self) -> CompositionResult<String> {
        toml::to_string(self).map_err(|e| CompositionError::config(format!("unserializable: {e}")))
    }
}

impl MotifConfig for ToolkitConfig {
    fn load_from_file(path: &Path) -> CompositionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompositionError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), mode = %config.registry.mode, "Loaded toolkit config");
        Ok(config)
    }

    fn merge_with_vars<I>(&mut self, vars: I) -> CompositionResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(Self::ENV_PREFIX) else {
                continue;
            };
            match key {
                "REGISTRY_MODE" => self.set_from_string("registry.mode", &value)?,
                "LOG_FILTER" => self.set_from_string("logging.filter", &value)?,
                _ => tracing::trace!(variable = %name, "Ignoring unrecognized override"),
            }
        }
        Ok(())
    }

    fn merge_with(&mut self, other: &Self) {
        if other.registry.mode != RegistryMode::default() {
            self.registry.mode = other.registry.mode;
        }
        if other.logging != LoggingConfig::default() {
            self.logging.filter.clone_from(&other.logging.filter);
        }
    }

    fn validate(&self) -> CompositionResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(CompositionError::config("logging.filter must not be empty"));
        }
        Ok(())
    }

    fn set_from_string(&mut self, key: &str, value: &str) -> CompositionResult<()> {
        match key {
            "registry.mode" => self.registry.mode = value.parse()?,
            "logging.filter" => self.logging.filter = value.to_string(),
            other => {
                return Err(CompositionError::config(format!("unknown config key '{other}'")));
            }
        }
        Ok(())
    }
}
