//! Run orchestration: resolve inputs, load, validate, summarize
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

use crate::config::ValidatorConfig;
use crate::error::{Error, Result};
use crate::loader::{load_text_annotations, load_visual_annotations};
use crate::report::{label_counts, sort_violations, summarize, InputStats, ValidationReport};
use crate::validation::Validator;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const TEXT_EXTENSIONS: &[&str] = &["csv"];
const VISUAL_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Everything a validation run needs
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Directory searched for input files
    pub directory: Option<PathBuf>,
    /// Explicit text-annotation file, overrides discovery
    pub text: Option<PathBuf>,
    /// Explicit visual-annotation file, overrides discovery
    pub visual: Option<PathBuf>,
    pub rules: ValidatorConfig,
}

impl RunConfig {
    pub fn new(rules: ValidatorConfig) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_text(mut self, path: impl Into<PathBuf>) -> Self {
        self.text = Some(path.into());
        self
    }

    pub fn with_visual(mut self, path: impl Into<PathBuf>) -> Self {
        self.visual = Some(path.into());
        self
    }

    /// Work out which files to read
    pub fn resolve_inputs(&self) -> Result<InputSet> {
        let mut inputs = InputSet {
            text: self.text.clone(),
            visual: self.visual.clone(),
        };

        if let Some(directory) = &self.directory {
            if inputs.text.is_none() || inputs.visual.is_none() {
                let discovered = InputSet::discover(directory)?;
                inputs.text = inputs.text.or(discovered.text);
                inputs.visual = inputs.visual.or(discovered.visual);
            }
        }

        if inputs.text.is_none() && inputs.visual.is_none() {
            return Err(Error::configuration(
                "no annotation files given: pass a directory or at least one of the text and visual files",
            ));
        }

        Ok(inputs)
    }
}

/// Files selected for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSet {
    pub text: Option<PathBuf>,
    pub visual: Option<PathBuf>,
}

impl InputSet {
    /// Find at most one text file and one visual file directly inside `directory`
    ///
    /// Hidden files such as `.annocheck.yaml` are never inputs.
    pub fn discover(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(Error::discovery(directory, "not a directory"));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(directory)
            .map_err(|e| Error::io(directory, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && !is_hidden(path))
            .collect();
        files.sort();

        Ok(Self {
            text: pick_single(directory, &files, TEXT_EXTENSIONS, "text (.csv)")?,
            visual: pick_single(directory, &files, VISUAL_EXTENSIONS, "visual (.json/.yaml)")?,
        })
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn pick_single(
    directory: &Path,
    files: &[PathBuf],
    extensions: &[&str],
    kind: &str,
) -> Result<Option<PathBuf>> {
    let matches: Vec<&PathBuf> = files
        .iter()
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some((*single).clone())),
        many => {
            let names: Vec<String> = many
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
            Err(Error::discovery(
                directory,
                format!(
                    "found {} {} annotation files ({}); pass the one to use explicitly",
                    many.len(),
                    kind,
                    names.join(", ")
                ),
            ))
        }
    }
}

/// Load every input, validate it and build the report
///
/// All files are loaded before any rule runs, so a malformed file aborts
/// the run without a partial report. Input files are only read.
#[instrument(skip(config))]
pub fn run(config: &RunConfig) -> Result<ValidationReport> {
    config.rules.validate()?;
    let inputs = config.resolve_inputs()?;
    info!(text = ?inputs.text, visual = ?inputs.visual, "Resolved inputs");

    let text_records = match &inputs.text {
        Some(path) => Some(load_text_annotations(path)?),
        None => None,
    };
    let visual = match &inputs.visual {
        Some(path) => Some(load_visual_annotations(path)?),
        None => None,
    };

    let validator = Validator::new(config.rules.clone());
    let mut stats = InputStats {
        text_file: inputs.text.as_ref().map(|p| p.display().to_string()),
        visual_file: inputs.visual.as_ref().map(|p| p.display().to_string()),
        ..InputStats::default()
    };
    let mut violations = Vec::new();

    if let Some(records) = &text_records {
        stats.text_records = records.len();
        stats.intents = label_counts(records.iter().map(|r| &r.intent));
        stats.confidence = label_counts(records.iter().map(|r| &r.confidence));
        violations.extend(validator.validate_text(records));
    }
    if let Some(dataset) = &visual {
        stats.images = dataset.images.len();
        stats.annotations = dataset.annotations.len();
        stats.categories = label_counts(dataset.annotations.iter().map(|a| &a.category));
        violations.extend(validator.validate_visual(&dataset.images, &dataset.annotations));
    }

    sort_violations(&mut violations);
    let summary = summarize(
        &violations,
        stats.text_records + stats.annotations,
        &config.rules.weights,
    );
    info!(
        records = summary.total_records,
        errors = summary.errors,
        warnings = summary.warnings,
        passed = summary.passed,
        "Validation run finished"
    );

    Ok(ValidationReport {
        inputs: stats,
        violations,
        summary,
    })
}
