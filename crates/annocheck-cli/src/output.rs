//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), including the
//! rendering of validation reports and the JSON Lines violation export.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use annocheck_core::{Severity, ValidationReport, Violation};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report
    fn format_report(&self, report: &ValidationReport, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human format falls back to pretty JSON for arbitrary values
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_report(&self, report: &ValidationReport, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report, use_color)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report in the configured format
    ///
    /// Quiet mode in human format keeps only the summary line.
    pub fn report(&mut self, report: &ValidationReport) -> Result<()> {
        trace!(violations = report.violations.len(), "Writing report");

        if self.quiet && self.format == OutputFormat::Human {
            let line = summary_line(report, self.use_color);
            return self.writeln(&line);
        }

        let formatted = self.format.format_report(report, self.use_color)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Write violations as JSON Lines, one object per line, in report order
pub fn write_violations_jsonl(violations: &[Violation], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for violation in violations {
        serde_json::to_writer(&mut writer, violation)?;
        writer.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;

    debug!(path = %path.display(), violations = violations.len(), "Wrote violation report");
    Ok(())
}

fn summary_line(report: &ValidationReport, use_color: bool) -> String {
    let summary = &report.summary;
    let verdict = if summary.passed { "PASSED" } else { "FAILED" };
    let verdict = match (use_color, summary.passed) {
        (false, _) => verdict.to_string(),
        (true, true) => verdict.green().bold().to_string(),
        (true, false) => verdict.red().bold().to_string(),
    };

    format!(
        "{}: {} error(s), {} warning(s), approval rate {}, quality score {:.3}",
        verdict,
        summary.errors,
        summary.warnings,
        percent(summary.approval_rate),
        summary.quality_score
    )
}

/// Format a validation report for human reading
fn format_report_human(report: &ValidationReport, use_color: bool) -> String {
    let mut output = String::new();
    let inputs = &report.inputs;
    let summary = &report.summary;

    output.push_str("═══ Annotation Validation Report ═══\n\n");

    output.push_str("Inputs:\n");
    if let Some(file) = &inputs.text_file {
        output.push_str(&format!("  Text:   {} ({} rows)\n", file, inputs.text_records));
    }
    if let Some(file) = &inputs.visual_file {
        output.push_str(&format!(
            "  Visual: {} ({} images, {} boxes)\n",
            file, inputs.images, inputs.annotations
        ));
    }
    output.push('\n');

    push_distribution(&mut output, "Intent distribution", &inputs.intents, inputs.text_records);
    push_distribution(&mut output, "Confidence levels", &inputs.confidence, inputs.text_records);
    push_distribution(&mut output, "Categories", &inputs.categories, inputs.annotations);

    output.push_str("Summary:\n");
    output.push_str(&format!("  Records:        {}\n", summary.total_records));
    output.push_str(&format!("  Approved:       {}\n", summary.approved_records));
    output.push_str(&format!("  Approval rate:  {}\n", percent(summary.approval_rate)));
    output.push_str(&format!(
        "  Violations:     {:.1} per 100 records\n",
        summary.violation_rate_per_100
    ));
    output.push_str(&format!("  Quality score:  {:.3}\n", summary.quality_score));
    output.push_str(&format!("  Errors:         {}\n", summary.errors));
    output.push_str(&format!("  Warnings:       {}\n", summary.warnings));

    if !summary.by_rule.is_empty() {
        output.push_str("\nBy rule:\n");
        for (rule, count) in &summary.by_rule {
            output.push_str(&format!("  • {}: {}\n", rule, count));
        }
    }

    for severity in [Severity::Error, Severity::Warning] {
        let listed: Vec<&Violation> = report
            .violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect();
        if listed.is_empty() {
            continue;
        }

        let title = match severity {
            Severity::Error => "Errors",
            Severity::Warning => "Warnings",
        };
        output.push_str(&format!("\n{} ({}):\n", title, listed.len()));
        for violation in listed {
            let rule = if use_color {
                match severity {
                    Severity::Error => violation.rule_id.to_string().red().to_string(),
                    Severity::Warning => violation.rule_id.to_string().yellow().to_string(),
                }
            } else {
                violation.rule_id.to_string()
            };
            output.push_str(&format!(
                "  {} {}: {}\n",
                rule, violation.record, violation.message
            ));
        }
    }

    output.push('\n');
    output.push_str(&summary_line(report, use_color));
    output.push('\n');
    output
}

/// Append one label table with counts and shares of `total`
fn push_distribution(output: &mut String, title: &str, counts: &BTreeMap<String, usize>, total: usize) {
    if counts.is_empty() || total == 0 {
        return;
    }

    let width = counts.keys().map(|label| label.len()).max().unwrap_or(0);
    output.push_str(&format!("{}:\n", title));
    for (label, count) in counts {
        output.push_str(&format!(
            "  {:width$}  {:>5}  ({})\n",
            label,
            count,
            percent(*count as f64 / total as f64),
            width = width
        ));
    }
    output.push('\n');
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
