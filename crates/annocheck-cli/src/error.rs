//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the annocheck-core library
    #[error(transparent)]
    Core(#[from] annocheck_core::Error),

    /// The run finished and found error-severity violations
    #[error("validation failed with {errors} error(s) across {records} record(s)")]
    ValidationFailed { errors: usize, records: usize },

    /// IO error bound to a path (config files, report files)
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO error writing to stdout
    #[error("IO error: {0}")]
    Output(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the exit code for this error
    ///
    /// Core errors keep their own codes (3-8) so scripts can tell a schema
    /// problem from a missing file.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } => 1,
            Self::Core(error) => error.exit_code(),
            Self::Io { .. } | Self::Output(_) => 6,
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) | Self::Toml(_) | Self::TomlSerialize(_) => 8,
        }
    }

    /// Whether the report has already been shown and only the exit code matters
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_core_errors_keep_their_exit_codes() {
        let error = Error::from(annocheck_core::Error::schema(Path::new("texts.csv"), "intent"));
        assert_eq!(error.exit_code(), 3);

        let error = Error::from(annocheck_core::Error::configuration("no inputs"));
        assert_eq!(error.exit_code(), 8);
    }

    #[test]
    fn test_validation_failure_exits_with_one() {
        let error = Error::ValidationFailed {
            errors: 2,
            records: 40,
        };
        assert_eq!(error.exit_code(), 1);
        assert!(error.is_reported());
    }

    #[test]
    fn test_format_error_names_file_and_reason() {
        let error = Error::from(annocheck_core::Error::parse(
            Path::new("boxes.json"),
            "annotations[0].bbox",
            "expected 4 coordinates, got 3",
        ));
        assert_eq!(
            format_error(&error, false),
            "Error: boxes.json: annotations[0].bbox: expected 4 coordinates, got 3"
        );
    }
}
