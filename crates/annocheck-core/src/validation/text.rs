//! Rules for text-intent annotations

use super::{percent, Validator};
use crate::model::{Confidence, Intent, Label, RecordId, TextAnnotation, Vocabulary};
use crate::report::{sort_violations, RuleId, Subject, Violation};
use std::collections::BTreeMap;
use tracing::{debug, trace};

impl Validator {
    /// Check every text record, then the dataset-level aggregates
    pub fn validate_text(&self, records: &[TextAnnotation]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for record in records {
            self.check_text_record(record, &mut violations);
        }
        self.check_duplicate_text_ids(records, &mut violations);
        self.check_class_balance(records, &mut violations);
        self.check_low_confidence(records, &mut violations);

        sort_violations(&mut violations);
        debug!(
            records = records.len(),
            violations = violations.len(),
            "Text validation finished"
        );
        violations
    }

    fn check_text_record(&self, record: &TextAnnotation, violations: &mut Vec<Violation>) {
        let subject = Subject::Message(record.record_id());

        if let Label::Unknown(raw) = &record.intent {
            violations.push(Violation::new(
                RuleId::InvalidIntent,
                subject.clone(),
                format!("intent {:?} is not one of {}", raw, names(Intent::ALL)),
            ));
        }

        if record.text.trim().is_empty() {
            violations.push(Violation::new(
                RuleId::EmptyMessage,
                subject.clone(),
                "message text is empty",
            ));
        }

        if let Label::Unknown(raw) = &record.confidence {
            violations.push(Violation::new(
                RuleId::InvalidConfidence,
                subject.clone(),
                format!("confidence {:?} is not one of {}", raw, names(Confidence::ALL)),
            ));
        }

        trace!(message_id = %record.message_id, "Checked text record");
    }

    fn check_duplicate_text_ids(&self, records: &[TextAnnotation], violations: &mut Vec<Violation>) {
        let mut counts: BTreeMap<RecordId, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.record_id()).or_insert(0) += 1;
        }

        for (message_id, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
            violations.push(
                Violation::new(
                    RuleId::DuplicateId,
                    Subject::Message(message_id.clone()),
                    format!("message_id \"{}\" appears {} times", message_id, count),
                )
                .affecting(count),
            );
        }
    }

    fn check_class_balance(&self, records: &[TextAnnotation], violations: &mut Vec<Violation>) {
        if records.is_empty() {
            return;
        }

        let mut counts: BTreeMap<Intent, usize> = Intent::ALL.iter().map(|i| (*i, 0)).collect();
        for intent in records.iter().filter_map(|r| r.intent.known()) {
            *counts.entry(intent).or_insert(0) += 1;
        }

        let band = self.config.balance_band;
        let total = records.len();
        let outside: Vec<String> = Intent::ALL
            .iter()
            .filter_map(|intent| {
                let count = counts.get(intent).copied().unwrap_or(0);
                let fraction = count as f64 / total as f64;
                (!band.contains(fraction)).then(|| {
                    format!("{} {} ({}/{})", intent, percent(fraction), count, total)
                })
            })
            .collect();

        if !outside.is_empty() {
            violations.push(Violation::new(
                RuleId::ClassImbalance,
                Subject::Dataset,
                format!(
                    "intent share outside {}..{}: {}",
                    percent(band.min),
                    percent(band.max),
                    outside.join(", ")
                ),
            ));
        }
    }

    fn check_low_confidence(&self, records: &[TextAnnotation], violations: &mut Vec<Violation>) {
        if records.is_empty() {
            return;
        }

        let low = records
            .iter()
            .filter(|r| r.confidence.known() == Some(Confidence::Low))
            .count();
        let fraction = low as f64 / records.len() as f64;

        if fraction > self.config.max_low_confidence + crate::TOLERANCE {
            violations.push(Violation::new(
                RuleId::LowConfidenceRatio,
                Subject::Dataset,
                format!(
                    "{} of {} rows ({}) have low confidence, limit is {}",
                    low,
                    records.len(),
                    percent(fraction),
                    percent(self.config.max_low_confidence)
                ),
            ));
        }
    }
}

fn names<T: Vocabulary>(members: &[T]) -> String {
    members
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
