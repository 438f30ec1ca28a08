//! Logging utilities for the Annocheck CLI
//!
//! This module provides:
//! - Structured logging setup on stderr
//! - Multiple output formats (compact, full, JSON)
//! - Performance timing spans

use crate::config::LoggingSection;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable ANSI colors when stderr is a terminal
    pub console: bool,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Module-based filtering
    pub module_filter: BTreeMap<String, String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for everyday use
    #[default]
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            thread_ids: false,
            source_location: false,
            module_filter: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the `logging` section of a config file
    ///
    /// A level from the file only applies when no `-v` flag was given.
    pub fn merge_with_file(&mut self, section: &LoggingSection, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &section.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = section.format {
            self.format = format;
        }
        for (module, level) in &section.modules {
            self.module_filter.insert(module.clone(), level.clone());
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("ANNOCHECK_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Warning: invalid ANNOCHECK_LOG_FORMAT '{}', using default", format),
            }
        }
    }
}

/// Initialize the global logging system
///
/// Logs always go to stderr so stdout carries only the report.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(&config)?;
    let ansi = config.console && std::io::stderr().is_terminal();

    // Each format yields a different subscriber type
    match config.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
        LogFormat::Full => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
    }

    tracing::debug!(config = ?config, "Logging system initialized");
    Ok(())
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    for (module, level) in &config.module_filter {
        filter = filter.add_directive(
            format!("{}={}", module, level)
                .parse()
                .map_err(|e| Error::config(format!("Invalid filter directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Create a span for a timed operation
pub fn create_operation_span(operation: &str) -> Span {
    tracing::info_span!("operation", operation = operation, duration_ms = field::Empty)
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation),
                operation: operation.to_string(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}
