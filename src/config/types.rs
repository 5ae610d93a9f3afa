//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::flavor::charset::DEFAULT_CHARSETS;
use crate::registry::DEFAULT_CACHE_CAPACITY;

/// Mapping source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingsConfig {
    /// Seed the registry from the built-in Wayland/X11 table
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Additional mapping files, read in order after the built-in table
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl Default for MappingsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            files: Vec::new(),
        }
    }
}

/// Text expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Charsets offered for text flavors, platform default first
    #[serde(default = "default_charsets")]
    pub charsets: Vec<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            charsets: default_charsets(),
        }
    }
}

/// Query result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Results remembered per direction (0 = no caching)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format ("pretty", "compact", "json")
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log file path (None = stderr only)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_charsets() -> Vec<String> {
    DEFAULT_CHARSETS.iter().map(|c| c.to_string()).collect()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
