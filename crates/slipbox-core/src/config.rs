// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pipeline configuration, read from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SYNTAX: &str = "plain";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_MAX_TRANSCLUSIONS: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse config: {0}")]
    InvalidToml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseConfig,
    pub eval: EvalConfig,
    pub encode: EncodeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Keep raw HTML from Markdown and `@@@` blocks
    pub allow_html: bool,
    /// Syntax used when a zettel's metadata names none
    pub default_syntax: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            allow_html: false,
            default_syntax: DEFAULT_SYNTAX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub max_transclusions: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_transclusions: DEFAULT_MAX_TRANSCLUSIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub lang: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration; a missing file yields `None`
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.parse.allow_html);
        assert_eq!(config.parse.default_syntax, "plain");
        assert_eq!(config.eval.max_transclusions, 1024);
        assert_eq!(config.encode.lang, "en");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[parse]
allow_html = true

[eval]
max_transclusions = 3
"#,
        )
        .unwrap();
        assert!(config.parse.allow_html);
        assert_eq!(config.parse.default_syntax, "plain");
        assert_eq!(config.eval.max_transclusions, 3);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[eval]\nmax_transclusions = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidToml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(temp_dir.path().join("absent.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slipbox.toml");
        std::fs::write(&path, "[encode]\nlang = \"de\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap().unwrap();
        assert_eq!(config.encode.lang, "de");

        std::fs::write(&path, "[encode\n").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }
}
