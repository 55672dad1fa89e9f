// Configuration for the value renderer

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Recursion depth beyond which nested containers and objects
    /// collapse to a one-line summary
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum container entries rendered before truncating
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Maximum characters of a string shown before truncating
    #[serde(default = "default_max_string")]
    pub max_string: usize,

    /// Indentation unit
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Quote character for strings and mapping keys
    #[serde(default = "default_key_quote")]
    pub key_quote: char,

    /// Apply ANSI styling
    #[serde(default)]
    pub color: bool,

    /// Show identity tokens on instance prefixes
    #[serde(default)]
    pub show_identity: bool,

    /// Collapse qualifying empty values to their minimal literal form
    #[serde(default = "default_true")]
    pub simple_empty: bool,
}

// Default values
fn default_max_depth() -> usize {
    6
}
fn default_max_items() -> usize {
    50
}
fn default_max_string() -> usize {
    120
}
fn default_indent() -> String {
    "    ".to_string()
}
fn default_key_quote() -> char {
    '\''
}
fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_items: default_max_items(),
            max_string: default_max_string(),
            indent: default_indent(),
            key_quote: default_key_quote(),
            color: false,
            show_identity: false,
            simple_empty: default_true(),
        }
    }
}

impl RenderConfig {
    /// Load configuration from a scry.json file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RenderConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from directory (searches for scry.json,
    /// walking up parent directories)
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let config_path = dir.as_ref().join("scry.json");

        if config_path.exists() {
            Self::from_file(config_path)
        } else {
            let mut current = dir.as_ref();
            while let Some(parent) = current.parent() {
                let config_path = parent.join("scry.json");
                if config_path.exists() {
                    return Self::from_file(config_path);
                }
                current = parent;
            }

            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Create example configuration text
    pub fn example() -> String {
        serde_json::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.max_items, 50);
        assert_eq!(config.indent, "    ");
        assert!(config.simple_empty);
        assert!(!config.color);
    }

    #[test]
    fn test_config_serialization() {
        let config = RenderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: RenderConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.max_depth, deserialized.max_depth);
        assert_eq!(config.key_quote, deserialized.key_quote);
    }

    #[test]
    fn test_partial_config_uses_field_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"max_items": 3}"#).unwrap();
        assert_eq!(config.max_items, 3);
        assert_eq!(config.max_depth, 6);
    }

    #[test]
    fn test_example_config() {
        let example = RenderConfig::example();
        assert!(example.contains("max_depth"));
        assert!(example.contains("max_items"));
        assert!(example.contains("indent"));
    }
}
