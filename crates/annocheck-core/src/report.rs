//! Violations, summaries and the final validation report
//!
//! Every rule reports through the same [`Violation`] shape so the report
//! schema stays stable as rules are added.
//!
//! Copyright (c) 2025 Annocheck Team
//! Licensed under the Apache-2.0 license

use crate::config::ScoreWeights;
use crate::model::{Label, RecordId, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How much a violation matters for the run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Printed but never fails the run on its own
    Warning,
    /// Fails the run
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Identifier of a validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    InvalidIntent,
    EmptyMessage,
    InvalidConfidence,
    DuplicateId,
    ClassImbalance,
    LowConfidenceRatio,
    InvalidCategory,
    OutOfBounds,
    BoxTooSmall,
    BackgroundTooLarge,
    ReferenceMissing,
    ImageUnannotated,
}

impl RuleId {
    pub const ALL: &'static [RuleId] = &[
        RuleId::InvalidIntent,
        RuleId::EmptyMessage,
        RuleId::InvalidConfidence,
        RuleId::DuplicateId,
        RuleId::ClassImbalance,
        RuleId::LowConfidenceRatio,
        RuleId::InvalidCategory,
        RuleId::OutOfBounds,
        RuleId::BoxTooSmall,
        RuleId::BackgroundTooLarge,
        RuleId::ReferenceMissing,
        RuleId::ImageUnannotated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::InvalidIntent => "invalid_intent",
            RuleId::EmptyMessage => "empty_message",
            RuleId::InvalidConfidence => "invalid_confidence",
            RuleId::DuplicateId => "duplicate_id",
            RuleId::ClassImbalance => "class_imbalance",
            RuleId::LowConfidenceRatio => "low_confidence_ratio",
            RuleId::InvalidCategory => "invalid_category",
            RuleId::OutOfBounds => "out_of_bounds",
            RuleId::BoxTooSmall => "box_too_small",
            RuleId::BackgroundTooLarge => "background_too_large",
            RuleId::ReferenceMissing => "reference_missing",
            RuleId::ImageUnannotated => "image_unannotated",
        }
    }

    /// Severity assigned to violations of this rule
    pub fn severity(&self) -> Severity {
        match self {
            RuleId::ClassImbalance | RuleId::LowConfidenceRatio | RuleId::ImageUnannotated => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// One-line description for rule listings
    pub fn description(&self) -> &'static str {
        match self {
            RuleId::InvalidIntent => "intent is not one of the enumerated intents",
            RuleId::EmptyMessage => "message text is empty or whitespace",
            RuleId::InvalidConfidence => "confidence is not high, medium or low",
            RuleId::DuplicateId => "record id is shared by more than one row or box",
            RuleId::ClassImbalance => "an intent's share of rows is outside the target band",
            RuleId::LowConfidenceRatio => "too many rows are labeled with low confidence",
            RuleId::InvalidCategory => "category is not one of the enumerated categories",
            RuleId::OutOfBounds => "less than the minimum visible fraction of the box is inside the image",
            RuleId::BoxTooSmall => "box is degenerate or covers too little of the image",
            RuleId::BackgroundTooLarge => "background box covers too much of the image",
            RuleId::ReferenceMissing => "box references an image that does not exist",
            RuleId::ImageUnannotated => "image has no boxes",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity a violation is attached to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    /// The whole dataset (aggregate checks)
    Dataset,
    /// A text annotation row, by `message_id`
    Message(RecordId),
    /// An image record
    Image(RecordId),
    /// A bounding-box annotation
    Annotation(RecordId),
}

impl Subject {
    /// Whether the subject counts as an annotation record for approval
    pub fn is_record(&self) -> bool {
        matches!(self, Subject::Message(_) | Subject::Annotation(_))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Dataset => write!(f, "dataset"),
            Subject::Message(id) => write!(f, "message {}", id),
            Subject::Image(id) => write!(f, "image {}", id),
            Subject::Annotation(id) => write!(f, "annotation {}", id),
        }
    }
}

/// A single rule failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: RuleId,
    pub record: Subject,
    pub message: String,
    pub severity: Severity,
    /// Input records rejected by this violation; more than one when the
    /// subject's id is shared
    #[serde(default = "one")]
    pub affected_records: usize,
}

fn one() -> usize {
    1
}

impl Violation {
    /// Create a violation with the rule's default severity
    pub fn new(rule_id: RuleId, record: Subject, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            record,
            message: message.into(),
            severity: rule_id.severity(),
            affected_records: 1,
        }
    }

    /// Mark the violation as covering every record that shares its subject
    pub fn affecting(mut self, records: usize) -> Self {
        self.affected_records = records;
        self
    }

    fn sort_key(&self) -> (&Subject, RuleId, &str) {
        (&self.record, self.rule_id, &self.message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.rule_id, self.record, self.message
        )
    }
}

/// Sort violations by record then rule, the order every report uses
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Aggregate figures for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Text rows plus bounding boxes
    pub total_records: usize,
    /// Records with no violation of any severity
    pub approved_records: usize,
    pub by_rule: BTreeMap<RuleId, usize>,
    pub errors: usize,
    pub warnings: usize,
    pub approval_rate: f64,
    /// Severity-weighted violations per 100 records
    pub violation_rate_per_100: f64,
    pub quality_score: f64,
    /// True when no error-severity violation exists
    pub passed: bool,
}

/// Count violations and derive approval rate and quality score
///
/// A subject shared by several records rejects as many records as its
/// widest violation covers.
pub fn summarize(violations: &[Violation], total_records: usize, weights: &ScoreWeights) -> Summary {
    let mut by_rule = BTreeMap::new();
    let mut errors = 0;
    let mut warnings = 0;
    let mut weighted = 0.0;
    let mut rejected: BTreeMap<&Subject, usize> = BTreeMap::new();

    for violation in violations {
        *by_rule.entry(violation.rule_id).or_insert(0) += 1;
        match violation.severity {
            Severity::Error => {
                errors += 1;
                weighted += weights.error;
            }
            Severity::Warning => {
                warnings += 1;
                weighted += weights.warning;
            }
        }
        if violation.record.is_record() {
            let covered = rejected.entry(&violation.record).or_insert(0);
            *covered = (*covered).max(violation.affected_records.max(1));
        }
    }

    let approved_records = total_records.saturating_sub(rejected.values().sum());
    let (approval_rate, violation_rate) = if total_records == 0 {
        (1.0, 0.0)
    } else {
        (
            approved_records as f64 / total_records as f64,
            weighted / total_records as f64,
        )
    };

    let weight_sum = weights.approval + weights.violation;
    let quality_score = if weight_sum > 0.0 {
        (weights.approval * approval_rate + weights.violation * (1.0 - violation_rate.min(1.0)))
            / weight_sum
    } else {
        approval_rate
    };

    Summary {
        total_records,
        approved_records,
        by_rule,
        errors,
        warnings,
        approval_rate,
        violation_rate_per_100: violation_rate * 100.0,
        quality_score,
        passed: errors == 0,
    }
}

/// What was read during the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStats {
    pub text_file: Option<String>,
    pub visual_file: Option<String>,
    pub text_records: usize,
    pub images: usize,
    pub annotations: usize,
    /// Rows per intent label
    #[serde(default)]
    pub intents: BTreeMap<String, usize>,
    /// Rows per confidence level
    #[serde(default)]
    pub confidence: BTreeMap<String, usize>,
    /// Boxes per category
    #[serde(default)]
    pub categories: BTreeMap<String, usize>,
}

/// Count labels by value
///
/// Every member of the vocabulary gets an entry, zero included. Values
/// outside the vocabulary are counted under their trimmed raw text.
pub fn label_counts<'a, T: Vocabulary>(
    labels: impl IntoIterator<Item = &'a Label<T>>,
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> =
        T::ALL.iter().map(|member| (member.as_str().to_string(), 0)).collect();

    for label in labels {
        let key = match label {
            Label::Known(value) => value.as_str().to_string(),
            Label::Unknown(raw) if raw.trim().is_empty() => "(empty)".to_string(),
            Label::Unknown(raw) => raw.trim().to_string(),
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    counts
}

/// Complete outcome of a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub inputs: InputStats,
    pub violations: Vec<Violation>,
    pub summary: Summary,
}

impl ValidationReport {
    /// Whether the run should exit successfully
    pub fn passed(&self) -> bool {
        self.summary.passed
    }

    /// Number of violations for one rule
    pub fn count(&self, rule_id: RuleId) -> usize {
        self.summary.by_rule.get(&rule_id).copied().unwrap_or(0)
    }
}
