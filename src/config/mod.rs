//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::registry::{BuiltinSource, FileSource, FlavorRegistry};

pub mod types;

pub use types::{CacheConfig, LoggingConfig, MappingsConfig, TextConfig};

/// Main configuration structure
///
/// ```toml
/// [mappings]
/// builtin = true
/// files = ["/etc/flavormap/flavormap.properties"]
///
/// [text]
/// charsets = ["UTF-8", "UTF-16LE"]
///
/// [cache]
/// capacity = 512
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Mapping sources
    #[serde(default)]
    pub mappings: MappingsConfig,
    /// Text expansion
    #[serde(default)]
    pub text: TextConfig,
    /// Query result cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.text.charsets.is_empty() {
            anyhow::bail!("At least one text charset must be configured");
        }
        if let Some(blank) = self.text.charsets.iter().position(|c| c.trim().is_empty()) {
            anyhow::bail!("Text charset #{} is empty", blank + 1);
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        if !self.mappings.builtin && self.mappings.files.is_empty() {
            tracing::warn!("No mapping sources configured; every lookup will be synthesized");
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, extra_files: Vec<PathBuf>, no_builtin: bool) -> Self {
        self.mappings.files.extend(extra_files);
        if no_builtin {
            self.mappings.builtin = false;
        }
        self
    }

    /// Build a registry from this configuration
    ///
    /// Mapping files are not read until the registry's first use.
    pub fn build_registry(&self) -> FlavorRegistry {
        let mut builder = FlavorRegistry::builder()
            .charsets(self.text.charsets.iter().cloned())
            .cache_capacity(self.cache.capacity);

        if self.mappings.builtin {
            builder = builder.source(BuiltinSource);
        }
        for file in &self.mappings.files {
            builder = builder.source(FileSource::new(file));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavor::Native;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert!(config.mappings.builtin);
        assert!(config.mappings.files.is_empty());
        assert_eq!(config.text.charsets[0], "UTF-8");
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[cache]\ncapacity = 8\n").unwrap();
        assert_eq!(config.cache.capacity, 8);
        assert!(config.mappings.builtin);
        assert_eq!(config.text.charsets.len(), 6);
    }

    #[test]
    fn test_config_validation_empty_charsets() {
        let mut config = Config::default_config();
        config.text.charsets.clear();
        assert!(config.validate().is_err());

        config.text.charsets = vec!["UTF-8".to_string(), " ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default_config();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_format() {
        let mut config = Config::default_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = dir.path().join("extra.properties");
        std::fs::write(&mappings, "CUSTOM = application/x-custom\n").unwrap();

        let config_path = dir.path().join("flavormap.toml");
        std::fs::write(
            &config_path,
            format!(
                "[mappings]\nbuiltin = false\nfiles = [{:?}]\n\n[text]\ncharsets = [\"utf8\"]\n",
                mappings.display().to_string()
            ),
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert!(!config.mappings.builtin);

        let registry = config.build_registry();
        assert_eq!(registry.natives_for(None), vec![Native::from("CUSTOM")]);
        assert_eq!(registry.charsets(), &["UTF-8".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/flavormap.toml").is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::default_config()
            .with_overrides(vec![PathBuf::from("/tmp/a.properties")], true);
        assert!(!config.mappings.builtin);
        assert_eq!(config.mappings.files, vec![PathBuf::from("/tmp/a.properties")]);
    }
}
