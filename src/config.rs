//! Tracer settings, loaded from an optional TOML file.
//!
//! ```toml
//! sentinel = 42
//! moved_tag = " [moved]"
//! indent = 2
//! color = true
//! elision = "guaranteed"   # or "disabled"
//! format = "text"          # or "json"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Whether returning a tracer by value from a factory is traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElisionMode {
    /// Return values are constructed in place (C++17 guaranteed elision).
    #[default]
    Guaranteed,
    /// Every return by value relocates through the move constructor.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracerConfig {
    /// Value stored in every freshly constructed resource cell.
    pub sentinel: i32,
    /// Appended to a tracer's name once it has been moved from.
    pub moved_tag: String,
    /// Indentation of lifecycle lines relative to scenario headers.
    pub indent: usize,
    pub color: bool,
    pub elision: ElisionMode,
    pub format: OutputFormat,
}

impl Default for TracerConfig {
    fn default() -> Self {
        TracerConfig {
            sentinel: 42,
            moved_tag: " [moved]".to_string(),
            indent: 2,
            color: true,
            elision: ElisionMode::Guaranteed,
            format: OutputFormat::Text,
        }
    }
}

impl TracerConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(path = %path.display(), ?config, "loaded tracer config");
        Ok(config)
    }

    /// Loads `path` when given, falls back to defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_classic_output() {
        let config = TracerConfig::default();
        assert_eq!(config.sentinel, 42);
        assert_eq!(config.moved_tag, " [moved]");
        assert_eq!(config.indent, 2);
        assert_eq!(config.elision, ElisionMode::Guaranteed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config =
            TracerConfig::from_toml_str("elision = \"disabled\"\n", Path::new("inline")).unwrap();
        assert_eq!(config.elision, ElisionMode::Disabled);
        assert_eq!(config.sentinel, 42);
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = TracerConfig::from_toml_str("colour = true\n", Path::new("inline"));
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sentinel = 7\nmoved_tag = \" (gone)\"\nformat = \"json\"").unwrap();

        let config = TracerConfig::load(file.path()).unwrap();
        assert_eq!(config.sentinel, 7);
        assert_eq!(config.moved_tag, " (gone)");
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = TracerConfig::load(Path::new("/definitely/not/here.toml"));
        match result {
            Err(Error::ConfigRead { path, .. }) => {
                assert_eq!(path, Path::new("/definitely/not/here.toml"))
            }
            other => panic!("expected ConfigRead, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(
            TracerConfig::load_or_default(None).unwrap(),
            TracerConfig::default()
        );
    }
}
