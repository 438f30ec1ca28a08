//! Check command handler

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{write_violations_jsonl, OutputWriter};
use annocheck_core::{run, RunConfig};
use tracing::{info, instrument, warn};

/// Handle the check command
///
/// The report is always printed in full before a failing run returns
/// [`Error::ValidationFailed`].
#[instrument(skip_all, fields(directory = ?args.directory))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("check_command");

    let rules = config.rules_with_overrides(&args)?;
    let run_config = RunConfig {
        directory: args.directory,
        text: args.text,
        visual: args.visual,
        rules,
    };

    let inputs = run_config.resolve_inputs()?;
    for path in inputs.text.iter().chain(inputs.visual.iter()) {
        output.info(&format!("Validating {}", path.display()))?;
    }

    let report = {
        let _run_timer = Timer::new("validation_run");
        run(&run_config)?
    };

    output.report(&report)?;

    if let Some(path) = &args.report {
        write_violations_jsonl(&report.violations, path)?;
        output.info(&format!("Wrote {} violation(s) to {}", report.violations.len(), path.display()))?;
    }

    let summary = &report.summary;
    if !summary.passed {
        warn!(errors = summary.errors, "Validation failed");
        return Err(Error::ValidationFailed {
            errors: summary.errors,
            records: summary.total_records,
        });
    }

    info!(warnings = summary.warnings, "Validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;
    use std::io;
    use std::path::Path;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(io::sink()))
    }

    fn write_texts(dir: &Path, rows: &[(&str, &str)]) {
        let mut content = String::from("message_id,text,intent,confidence\n");
        for (id, intent) in rows {
            content.push_str(&format!("{},some text,{},high\n", id, intent));
        }
        fs::write(dir.join("texts.csv"), content).unwrap();
    }

    fn balanced_rows() -> Vec<(String, &'static str)> {
        let intents = [
            "billing_inquiry",
            "technical_support",
            "feature_request",
            "cancellation",
            "general_question",
        ];
        (0..10)
            .flat_map(|n| intents.iter().map(move |i| (format!("{}_{}", i, n), *i)))
            .collect()
    }

    #[test]
    fn test_clean_directory_passes() {
        let dir = tempfile::tempdir().unwrap();
        let rows = balanced_rows();
        let rows: Vec<(&str, &str)> = rows.iter().map(|(id, i)| (id.as_str(), *i)).collect();
        write_texts(dir.path(), &rows);

        let args = CheckArgs {
            directory: Some(dir.path().to_path_buf()),
            ..CheckArgs::default()
        };
        assert!(handle_check(args, &Config::default(), &mut quiet_output()).is_ok());
    }

    #[test]
    fn test_error_violation_fails_with_exit_one_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = balanced_rows();
        rows[0].1 = "refund";
        let rows: Vec<(&str, &str)> = rows.iter().map(|(id, i)| (id.as_str(), *i)).collect();
        write_texts(dir.path(), &rows);
        let report_path = dir.path().join("out").join("violations.jsonl");
        fs::create_dir_all(report_path.parent().unwrap()).unwrap();

        let args = CheckArgs {
            directory: Some(dir.path().to_path_buf()),
            report: Some(report_path.clone()),
            ..CheckArgs::default()
        };
        let error = handle_check(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert_eq!(error.exit_code(), 1);

        let content = fs::read_to_string(&report_path).unwrap();
        assert!(content.lines().any(|line| line.contains("\"invalid_intent\"")));
    }

    #[test]
    fn test_flag_override_is_validated_before_loading() {
        let args = CheckArgs {
            text: Some("missing.csv".into()),
            min_visible: Some(1.5),
            ..CheckArgs::default()
        };
        let error = handle_check(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert_eq!(error.exit_code(), 8);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let args = CheckArgs {
            text: Some("definitely-missing.csv".into()),
            ..CheckArgs::default()
        };
        let error = handle_check(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert_eq!(error.exit_code(), 6);
    }
}
