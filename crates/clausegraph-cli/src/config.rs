//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use clausegraph_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default model used when neither flag, environment nor file names one.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Model provider settings
    #[serde(default)]
    pub model: ModelSettings,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Model provider settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Ollama endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clausegraph").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config
            .extractor
            .validate()
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Model name after applying a command-line override.
    pub fn model_name(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.model.name.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Endpoint after applying a command-line override.
    pub fn endpoint(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.model.endpoint.clone())
            .unwrap_or_else(|| clausegraph_llm::ollama::DEFAULT_ENDPOINT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[extractor]\nmax_attempts = 5\n\n[model]\nname = \"mistral\"\n\n[settings]\ncolor = false"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.extractor.max_attempts, 5);
        assert_eq!(config.extractor.proximity_factor, 0.7);
        assert_eq!(config.model_name(None), "mistral");
        assert_eq!(config.model_name(Some("llama3.1:70b")), "llama3.1:70b");
        assert!(!config.settings.color);
    }

    #[test]
    fn test_invalid_extractor_settings_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[extractor]\nmax_attempts = 0").unwrap();

        assert!(matches!(Config::load(Some(file.path())), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(CliError::Io(_))));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint(None), "http://localhost:11434");
        assert_eq!(config.model_name(None), DEFAULT_MODEL);
        assert!(config.settings.color);
    }
}
