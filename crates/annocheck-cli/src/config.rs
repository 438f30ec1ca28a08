//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments

use crate::cli::{CheckArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use annocheck_core::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File names searched in the working directory, in order
const PROJECT_CONFIG_FILES: &[&str] = &[
    ".annocheck.yaml",
    ".annocheck.yml",
    ".annocheck.json",
    ".annocheck.toml",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule thresholds and score weights
    pub rules: ValidatorConfig,

    /// Output settings
    pub output: OutputSection,

    /// Logging settings
    pub logging: LoggingSection,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output when writing to a terminal
    pub color: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error), used when no -v flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<LogFormat>,

    /// Per-module levels, e.g. `annocheck_core: debug`
    pub modules: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let config = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.rules.validate()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = PROJECT_CONFIG_FILES.iter().map(PathBuf::from).collect();

        if let Some(path) = Self::user_config_path() {
            paths.push(path);
        }

        paths
    }

    /// User-level configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("annocheck").join("config.yaml"))
    }

    /// Rule thresholds with the command-line overrides applied
    pub fn rules_with_overrides(&self, args: &CheckArgs) -> Result<ValidatorConfig> {
        let mut rules = self.rules.clone();

        if let Some(value) = args.balance_min {
            rules.balance_band.min = value;
        }
        if let Some(value) = args.balance_max {
            rules.balance_band.max = value;
        }
        if let Some(value) = args.max_low_confidence {
            rules.max_low_confidence = value;
        }
        if let Some(value) = args.min_box_area {
            rules.min_box_area = value;
        }
        if let Some(value) = args.min_background_area {
            rules.min_background_area = value;
        }
        if let Some(value) = args.max_background_area {
            rules.max_background_area = value;
        }
        if let Some(value) = args.min_visible {
            rules.min_visible = value;
        }

        rules.validate()?;
        Ok(rules)
    }

    /// Serialize in the format implied by the file extension and write it
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}
