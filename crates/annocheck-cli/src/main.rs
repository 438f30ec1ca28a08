//! Annocheck CLI - Command-line interface for annotation dataset validation
//!
//! This is the main entry point for the `annocheck` binary, providing
//! commands for validating annotation files, listing rules and managing
//! configuration.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    // Configuration is needed before logging so its `logging` section applies
    let config = Config::load_with_file(cli.config.as_deref());
    let use_color = cli.use_color(config.as_ref().map(|c| c.output.color).unwrap_or(true));
    control::set_override(use_color);

    let logging_section = config.as_ref().map(|c| c.logging.clone()).unwrap_or_default();
    if let Err(e) = init_logging(&cli, &logging_section) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = config.and_then(|config| run(cli, config, use_color));

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            if !e.is_reported() {
                eprintln!("{}", error::format_error(&e, use_color));
            }
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli.output.unwrap_or(config.output.format);
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output),
        Commands::Rules => handlers::handle_rules(&mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, section: &config::LoggingSection) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.merge_with_file(section, verbosity);
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
