// Tests for report rendering and the JSON Lines export

use super::*;
use annocheck_core::{
    summarize, InputStats, RecordId, RuleId, ScoreWeights, Subject, ValidationReport, Violation,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Writer that keeps everything written so tests can inspect it
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn sample_report() -> ValidationReport {
    let violations = vec![
        Violation::new(
            RuleId::ClassImbalance,
            Subject::Dataset,
            "intent share outside 15.0%..25.0%: cancellation 35.0% (14/40)",
        ),
        Violation::new(
            RuleId::InvalidIntent,
            Subject::Message(RecordId::from("m7")),
            "intent \"refund\" is not one of billing_inquiry, technical_support, feature_request, cancellation, general_question",
        ),
    ];
    let summary = summarize(&violations, 40, &ScoreWeights::default());
    ValidationReport {
        inputs: InputStats {
            text_file: Some("data/texts.csv".to_string()),
            visual_file: None,
            text_records: 40,
            images: 0,
            annotations: 0,
            intents: [
                ("billing_inquiry", 8),
                ("cancellation", 14),
                ("feature_request", 8),
                ("general_question", 5),
                ("refund", 1),
                ("technical_support", 4),
            ]
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect(),
            confidence: [("high", 36), ("low", 4), ("medium", 0)]
                .iter()
                .map(|(label, count)| (label.to_string(), *count))
                .collect(),
            categories: BTreeMap::new(),
        },
        violations,
        summary,
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_human_report_lists_summary_and_violations() {
    let formatted = format_report_human(&sample_report(), false);

    assert!(formatted.contains("═══ Annotation Validation Report ═══"));
    assert!(formatted.contains("Text:   data/texts.csv (40 rows)"));
    assert!(formatted.contains("Approval rate:  97.5%"));
    assert!(formatted.contains("Errors:         1"));
    assert!(formatted.contains("Warnings:       1"));
    assert!(formatted.contains("• invalid_intent: 1"));
    assert!(formatted.contains("Errors (1):\n  invalid_intent message m7: intent \"refund\""));
    assert!(formatted.contains("Warnings (1):\n  class_imbalance dataset:"));
    assert!(formatted
        .trim_end()
        .ends_with("FAILED: 1 error(s), 1 warning(s), approval rate 97.5%, quality score 0.973"));
}

#[test]
fn test_human_report_shows_label_distributions() {
    let formatted = format_report_human(&sample_report(), false);

    assert!(formatted.contains("Intent distribution:\n"));
    assert!(formatted.contains(&format!("  {:17}  {:>5}  (35.0%)\n", "cancellation", 14)));
    assert!(formatted.contains(&format!("  {:17}  {:>5}  (2.5%)\n", "refund", 1)));
    assert!(formatted.contains("Confidence levels:\n"));
    assert!(formatted.contains(&format!("  {:6}  {:>5}  (10.0%)\n", "low", 4)));
    // no boxes were read
    assert!(!formatted.contains("Categories:"));
}

#[test]
fn test_clean_report_passes() {
    let report = ValidationReport {
        inputs: InputStats::default(),
        violations: Vec::new(),
        summary: summarize(&[], 10, &ScoreWeights::default()),
    };
    let formatted = format_report_human(&report, false);
    assert!(formatted.contains("PASSED: 0 error(s), 0 warning(s), approval rate 100.0%"));
    assert!(!formatted.contains("Errors ("));
}

#[test]
fn test_json_report_round_trips() {
    let report = sample_report();
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.report(&report).unwrap();

    let parsed: ValidationReport = serde_json::from_str(buffer.contents().trim()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_serialized_report_is_stable() {
    let report = sample_report();
    let first = OutputFormat::JsonPretty.format_report(&report, false).unwrap();
    let second = OutputFormat::JsonPretty.format_report(&report, false).unwrap();
    assert_eq!(first, second);

    let yaml = OutputFormat::Yaml.format_report(&report, false).unwrap();
    assert!(yaml.contains("rule_id: invalid_intent"));
}

#[test]
fn test_quiet_human_output_is_one_line() {
    let (mut output, buffer) = writer(OutputFormat::Human, true);
    output.info("Validating").unwrap();
    output.report(&sample_report()).unwrap();

    let contents = buffer.contents();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.starts_with("FAILED: 1 error(s), 1 warning(s)"));
}

#[test]
fn test_messages_are_suppressed_for_machine_formats() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.info("Validating").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    assert!(buffer.contents().is_empty());
}

#[test]
fn test_table_alignment() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output
        .table(
            &["RULE", "SEVERITY"],
            vec![
                vec!["invalid_intent".to_string(), "error".to_string()],
                vec!["class_imbalance".to_string(), "warning".to_string()],
            ],
        )
        .unwrap();

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], format!("{:15} │ SEVERITY", "RULE"));
    assert!(lines[2].starts_with("invalid_intent  │ error"));
}

#[test]
fn test_jsonl_writes_one_violation_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("violations.jsonl");
    let report = sample_report();

    write_violations_jsonl(&report.violations, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["rule_id"], "class_imbalance");
    assert_eq!(first["record"]["kind"], "dataset");
    let second: Violation = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second, report.violations[1]);
}
