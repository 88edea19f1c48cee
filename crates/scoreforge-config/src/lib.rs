//! Configuration system for ScoreForge.
//!
//! Load scoring configuration from TOML or YAML files to control assertion
//! modes, constraint match tracking and constraint weights without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use scoreforge_config::{EnvironmentMode, ScoringConfig};
//!
//! let config = ScoringConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     constraint_match_enabled = true
//!
//!     [constraint_weights]
//!     "rooms/Room conflict" = "1hard/0soft"
//!     "Preferred room" = "0hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert!(config.constraint_match_enabled);
//! assert_eq!(config.constraint_weights.len(), 2);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use scoreforge_config::ScoringConfig;
//!
//! let config = ScoringConfig::load("scoring.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use scoreforge_core::ScoreForgeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ScoreForgeError {
    fn from(err: ConfigError) -> Self {
        ScoreForgeError::Config(err.to_string())
    }
}

/// Scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Environment mode controlling score corruption assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Track constraint match totals and indictments.
    ///
    /// Roughly doubles the bookkeeping per match.
    #[serde(default)]
    pub constraint_match_enabled: bool,

    /// Constraint weight overrides, keyed by `package/name` or bare name.
    ///
    /// Values are score strings such as `"1hard/0soft"`, parsed by the
    /// score type of the solution.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl ScoringConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Enables or disables constraint match tracking.
    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    /// Overrides the weight of one constraint.
    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Returns the configured weight text for a constraint.
    ///
    /// The full name `package/name` takes precedence over the bare name.
    pub fn constraint_weight(&self, full_name: &str, name: &str) -> Option<&str> {
        self.constraint_weights
            .get(full_name)
            .or_else(|| self.constraint_weights.get(name))
            .map(String::as_str)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = self.constraint_weights.keys().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "constraint weight key ({key:?}) must name a constraint"
            )));
        }
        Ok(())
    }
}

/// Environment mode affecting score assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Non-reproducible mode with minimal overhead.
    #[default]
    NonReproducible,

    /// Reproducible mode with deterministic behavior.
    Reproducible,

    /// Fast assert mode: from-scratch checks run only when requested.
    FastAssert,

    /// Full assert mode: every calculated score is checked from scratch.
    FullAssert,
}

impl EnvironmentMode {
    /// Returns true for the modes that verify incremental scores.
    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Returns true if every calculated score must be checked from scratch.
    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }
}
