//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module re-exports the
//! entry points used by `main`.

mod check;
mod completions;
mod config;
mod rules;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use rules::handle_rules;
