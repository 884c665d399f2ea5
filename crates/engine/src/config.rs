//! Engine configuration via `txprop.toml`
//!
//! A small TOML file holding the default propagation and whether metrics
//! are maintained. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use txprop_core::Propagation;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "txprop.toml";

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written
    #[error("failed to access config file '{}': {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// The config could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `default_propagation` names no known mode
    #[error(
        "invalid default_propagation '{0}' in txprop.toml. Expected one of \"required\", \
         \"requires_new\", \"mandatory\", \"never\", \"not_supported\", \"supports\"."
    )]
    InvalidPropagation(String),
}

/// Engine configuration loaded from `txprop.toml`.
///
/// # Example
///
/// ```toml
/// # Propagation used by PropagationEngine::execute
/// default_propagation = "required"
/// # Maintain propagation metrics counters
/// metrics = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Propagation used when no mode is given.
    #[serde(default = "default_propagation_str")]
    pub default_propagation: String,
    /// Maintain metrics counters.
    #[serde(default = "default_metrics")]
    pub metrics: bool,
}

fn default_propagation_str() -> String {
    Propagation::default().name().to_string()
}

fn default_metrics() -> bool {
    true
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            default_propagation: default_propagation_str(),
            metrics: default_metrics(),
        }
    }
}

impl PropagationConfig {
    /// Build a config with the given default propagation
    pub fn with_default_propagation(mut self, propagation: Propagation) -> Self {
        self.default_propagation = propagation.name().to_string();
        self
    }

    /// Enable or disable metrics counters
    pub fn with_metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        self
    }

    /// Parse `default_propagation` into a `Propagation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not one of the six modes.
    pub fn propagation(&self) -> Result<Propagation, ConfigError> {
        self.default_propagation
            .parse()
            .map_err(|_| ConfigError::InvalidPropagation(self.default_propagation.clone()))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# txprop engine configuration
#
# Propagation used by PropagationEngine::execute. One of:
#   "required"      = join the active transaction or begin one (default)
#   "requires_new"  = always begin a fresh transaction
#   "mandatory"     = join the active transaction, fail without one
#   "never"         = run without a transaction, fail with one
#   "not_supported" = run without a transaction, suspending any active one
#   "supports"      = join the active transaction if there is one
default_propagation = "required"

# Maintain propagation metrics counters (default: true)
metrics = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown propagation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PropagationConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        // Validate the propagation name eagerly
        config.propagation()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
