//! Error types for loading annotation files and configuring a run
//!
//! Load-time failures are fatal: they abort the run before a report exists.
//! Rule-level problems are never errors, they are
//! [`Violation`](crate::Violation)s collected into the report.
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for annocheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error raised while loading inputs or preparing a run
#[derive(Error, Debug)]
pub enum Error {
    /// A required column or field is missing from an input file
    #[error("{}: missing required field '{field}'", path.display())]
    Schema { path: PathBuf, field: String },

    /// A value cannot be coerced to its declared type
    #[error("{}: {location}: {message}", path.display())]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },

    /// A box references an image that the document does not define
    #[error("{}: annotation {annotation} references unknown image_id {image_id}", path.display())]
    Reference {
        path: PathBuf,
        annotation: String,
        image_id: String,
    },

    /// The file could not be read
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input files could not be located in a directory
    #[error("{}: {message}", path.display())]
    Discovery { path: PathBuf, message: String },

    /// Thresholds or inputs are unusable
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create a schema error for a missing field
    pub fn schema(path: &Path, field: impl Into<String>) -> Self {
        Self::Schema {
            path: path.to_path_buf(),
            field: field.into(),
        }
    }

    /// Create a parse error at a location such as `row 4` or `annotations[2].bbox`
    pub fn parse(path: &Path, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a discovery error
    pub fn discovery(path: &Path, message: impl Into<String>) -> Self {
        Self::Discovery {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The offending file, when the error is tied to one
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Schema { path, .. }
            | Self::Parse { path, .. }
            | Self::Reference { path, .. }
            | Self::Io { path, .. }
            | Self::Discovery { path, .. } => Some(path),
            Self::Configuration { .. } => None,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Schema { .. } => 3,
            Self::Parse { .. } => 4,
            Self::Reference { .. } => 5,
            Self::Io { .. } => 6,
            Self::Discovery { .. } => 7,
            Self::Configuration { .. } => 8,
        }
    }
}
