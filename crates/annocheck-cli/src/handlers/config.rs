//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    if args.path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            args.path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&args.path)?;
    output.success(&format!("✓ Created config at {}", args.path.display()))?;
    output.info("Edit it to adjust rule thresholds and output settings.")?;
    Ok(())
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render(config, args.format)?;
    output.writeln(content.trim_end())
}

fn render(config: &Config, format: ConfigFormat) -> Result<String> {
    Ok(match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}
