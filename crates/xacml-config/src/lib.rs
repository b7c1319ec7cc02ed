//! Configuration management for the XACML datatype registry
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (XACML_* prefix, `__` between section and key)
//! 2. xacml.local.toml (gitignored, local overrides)
//! 3. xacml.toml (git-tracked, project config)
//! 4. ~/.config/xacml/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XacmlConfig {
    pub registry: RegistryConfig,
    pub conversion: ConversionConfig,
}

/// Which datatypes the factory registers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Also register the XACML 1.x/2.0 duration identifiers
    pub legacy_identifiers: bool,
    /// Datatype identifiers left out of the factory
    pub disabled: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            legacy_identifiers: true,
            disabled: Vec::new(),
        }
    }
}

/// How sources are read before parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Trim XML whitespace around textual sources of non-string datatypes
    pub collapse_whitespace: bool,
}

impl XacmlConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Exact lexical forms only, current identifiers only
    pub fn strict() -> Self {
        Self {
            registry: RegistryConfig {
                legacy_identifiers: false,
                ..Default::default()
            },
            conversion: ConversionConfig {
                collapse_whitespace: false,
            },
        }
    }

    /// Legacy identifiers and whitespace trimming enabled
    pub fn lenient() -> Self {
        Self {
            registry: RegistryConfig {
                legacy_identifiers: true,
                ..Default::default()
            },
            conversion: ConversionConfig {
                collapse_whitespace: true,
            },
        }
    }

    /// Rejects settings the registry cannot act on
    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in &self.registry.disabled {
            if id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "registry.disabled contains an empty identifier".to_string(),
                ));
            }
            if id.chars().any(char::is_whitespace) {
                return Err(ConfigError::ValidationError(format!(
                    "registry.disabled identifier '{id}' contains whitespace"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = XacmlConfig::default();
        assert!(config.registry.legacy_identifiers);
        assert!(config.registry.disabled.is_empty());
        assert!(!config.conversion.collapse_whitespace);
    }

    #[test]
    fn test_strict_config() {
        let config = XacmlConfig::strict();
        assert!(!config.registry.legacy_identifiers);
        assert!(!config.conversion.collapse_whitespace);
    }

    #[test]
    fn test_lenient_config() {
        let config = XacmlConfig::lenient();
        assert!(config.registry.legacy_identifiers);
        assert!(config.conversion.collapse_whitespace);
    }

    #[test]
    fn test_validation() {
        let mut config = XacmlConfig::default();
        assert!(config.validate().is_ok());

        config.registry.disabled = vec![String::new()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.registry.disabled = vec!["urn:a b".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = XacmlConfig::lenient();
        let text = toml::to_string(&config).unwrap();
        let back: XacmlConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
