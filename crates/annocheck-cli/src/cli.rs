//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Annocheck - validate manually annotated datasets
///
/// Checks text-intent annotations (CSV) and bounding-box annotations
/// (COCO-style JSON or YAML) against a fixed rule set and reports every
/// violation with an overall approval rate and quality score.
#[derive(Parser, Debug)]
#[command(
    name = "annocheck",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ANNOCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate annotation files and report violations
    Check(CheckArgs),

    /// List every validation rule with its severity
    Rules,

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug, Default)]
pub struct CheckArgs {
    /// Directory holding one .csv text file and/or one .json/.yaml visual file
    #[arg(value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Text-annotation CSV file (overrides discovery)
    #[arg(long, value_name = "FILE")]
    pub text: Option<PathBuf>,

    /// Bounding-box annotation file (overrides discovery)
    #[arg(long, value_name = "FILE")]
    pub visual: Option<PathBuf>,

    /// Lower bound of each intent's share of rows
    #[arg(long, value_name = "FRACTION")]
    pub balance_min: Option<f64>,

    /// Upper bound of each intent's share of rows
    #[arg(long, value_name = "FRACTION")]
    pub balance_max: Option<f64>,

    /// Largest acceptable share of low-confidence rows
    #[arg(long, value_name = "FRACTION")]
    pub max_low_confidence: Option<f64>,

    /// Minimum box area as a fraction of image area
    #[arg(long, value_name = "FRACTION")]
    pub min_box_area: Option<f64>,

    /// Minimum background box area as a fraction of image area
    #[arg(long, value_name = "FRACTION")]
    pub min_background_area: Option<f64>,

    /// Largest area fraction a background box may cover
    #[arg(long, value_name = "FRACTION")]
    pub max_background_area: Option<f64>,

    /// Minimum fraction of a box that must lie inside its image
    #[arg(long, value_name = "FRACTION")]
    pub min_visible: Option<f64>,

    /// Also write violations as JSON Lines to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file
    #[arg(long, default_value = ".annocheck.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self, configured: bool) -> bool {
        configured && !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
